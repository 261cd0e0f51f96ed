use anyhow::Context;
use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, UserSummary},
        password,
    },
    error::AppError,
    extract::ValidJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Unknown usernames and wrong passwords get the same 401 so the endpoint
/// can't be used to enumerate accounts. The logs keep the distinction.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = payload.username.trim().to_string();

    let found = state
        .users
        .find_by_username(&username)
        .await
        .context("find user by username")?;
    let Some(user) = found else {
        warn!(%username, "login for unknown user");
        return Err(AppError::InvalidCredentials);
    };

    if !password::verify(payload.password, user.password_hash.clone()).await? {
        warn!(%username, user_id = user.id, "login with invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .jwt
        .sign(user.id, &user.fullname, &user.username)
        .context("sign access token")?;

    info!(user_id = user.id, %username, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".into(),
        token,
        expires_in: state.jwt.ttl().as_secs(),
        user: UserSummary {
            id: user.id,
            fullname: user.fullname,
            username: user.username,
        },
    }))
}
