use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, MessageResponse, PublicUser, UpdateUserRequest},
    repo::{NewUser, RepoError, UserChanges},
};
use crate::{
    auth::{middleware::AuthUser, password},
    error::AppError,
    extract::{ValidJson, ValidPath},
    state::AppState,
};

fn write_error(e: RepoError, what: &'static str) -> AppError {
    match e {
        RepoError::UsernameTaken => AppError::Conflict("Username already taken".into()),
        other => AppError::Internal(anyhow::Error::new(other).context(what)),
    }
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let password_hash = password::hash(payload.password).await?;

    let user = state
        .users
        .create(NewUser {
            firstname: payload.firstname,
            fullname: payload.fullname,
            lastname: payload.lastname,
            username: payload.username,
            password_hash,
            status: payload.status,
        })
        .await
        .map_err(|e| write_error(e, "insert user"))?;

    info!(user_id = user.id, username = %user.username, "user created");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, caller), fields(caller = %caller.username))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = state.users.list().await.context("list users")?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, caller), fields(caller = %caller.username))]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .users
        .find_by_id(id)
        .await
        .context("fetch user")?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(PublicUser::from(user)))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.username))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let password_hash = match payload.password {
        Some(plain) => Some(password::hash(plain).await?),
        None => None,
    };

    let updated = state
        .users
        .update(
            id,
            UserChanges {
                firstname: payload.firstname,
                fullname: payload.fullname,
                lastname: payload.lastname,
                username: payload.username,
                status: payload.status,
                password_hash,
            },
        )
        .await
        .map_err(|e| write_error(e, "update user"))?;

    if !updated {
        warn!(user_id = id, "update of unknown user");
        return Err(AppError::NotFound("User"));
    }

    info!(user_id = id, "user updated");
    Ok(Json(MessageResponse {
        message: "User updated successfully",
    }))
}

#[instrument(skip(state, caller), fields(caller = %caller.username))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    ValidPath(id): ValidPath<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let deleted = state.users.delete(id).await.context("delete user")?;
    if !deleted {
        return Err(AppError::NotFound("User"));
    }

    info!(user_id = id, deleted_by = caller.id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
