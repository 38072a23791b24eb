//! HTTP request handlers

use super::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use duodeck_common::control::{HealthResponse, SkipResponse, StatusResponse};
use tracing::info;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "duodeck-xc".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: format!("{} ({})", env!("GIT_HASH"), env!("BUILD_TIMESTAMP")),
    })
}

/// GET /status - scheduler snapshot
pub async fn status(State(app): State<AppState>) -> Json<StatusResponse> {
    Json(app.state.status().await)
}

/// POST /skip - request an immediate crossfade
///
/// Always accepted; the scheduler consumes the request at its next
/// decision point.
pub async fn skip(State(app): State<AppState>) -> (StatusCode, Json<SkipResponse>) {
    let pending = app.state.skip().request();
    info!("Skip requested over HTTP ({} pending)", pending);
    (
        StatusCode::ACCEPTED,
        Json(SkipResponse {
            accepted: true,
            pending,
        }),
    )
}
