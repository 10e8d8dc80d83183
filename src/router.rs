use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        .route("/api/lab/launch", post(handlers::launch_lab))
        .route("/api/lab/status", get(handlers::lab_status))
        .layer(cors)
        .with_state(state)
}
