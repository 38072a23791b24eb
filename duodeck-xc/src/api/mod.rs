//! Control-plane HTTP API
//!
//! Local-only endpoints for requesting a skip and inspecting the scheduler.
//! Bound to the loopback address by default.

pub mod handlers;

use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use duodeck_common::control::{HEALTH_PATH, SKIP_PATH, STATUS_PATH};
use duodeck_common::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub state: Arc<SharedState>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .route(STATUS_PATH, get(handlers::status))
        .route(SKIP_PATH, post(handlers::skip))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the control API until the task is dropped
pub async fn serve(listen: SocketAddr, state: Arc<SharedState>) -> Result<()> {
    let app = create_router(AppState { state });

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", listen, e)))?;
    info!("Control API listening on http://{}", listen);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
