pub mod dto;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod repo;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{auth::middleware::require_auth, state::AppState};

/// Registration is open; everything else requires a bearer token.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/users", post(handlers::create_user));

    let protected = Router::new()
        .route("/users", get(handlers::list_users))
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(protected)
}
