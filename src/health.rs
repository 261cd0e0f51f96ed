use anyhow::Context;
use axum::{extract::State, Json};
use serde::Serialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

/// Round-trips to the database so a 200 means the pool is usable.
#[instrument(skip(state))]
pub async fn ping(State(state): State<AppState>) -> Result<Json<PingResponse>, AppError> {
    let time = state
        .users
        .server_time()
        .await
        .context("database ping")?;
    Ok(Json(PingResponse { status: "ok", time }))
}
