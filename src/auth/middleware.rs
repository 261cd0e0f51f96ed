use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::jwt::{Claims, JwtKeys};
use crate::error::AppError;

/// Identity of the caller, attached to the request by [`require_auth`].
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct AuthUser {
    pub id: i64,
    pub fullname: String,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            fullname: claims.fullname,
            username: claims.username,
        }
    }
}

/// Gate for protected routes. Any failure is the same bare 401 so callers
/// can't tell a forged token from an expired one.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        warn!("missing or malformed Authorization header");
        return Err(AppError::Unauthorized);
    };

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "rejected access token");
        AppError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(req).await)
}

/// Expects exactly `Bearer <token>`: case-sensitive scheme, one space, no padding.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty() && !t.contains(char::is_whitespace))
}
