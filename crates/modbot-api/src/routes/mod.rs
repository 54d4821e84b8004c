//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{commands, health};
use crate::state::AppState;

/// Create the main API router with all routes mounted under /api/v1
pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(health_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new().route(
        "/communities/:community_id/commands",
        post(commands::dispatch_command),
    )
}
