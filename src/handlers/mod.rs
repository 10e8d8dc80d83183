use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::run::LaunchOutcome;
use crate::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct LaunchResponse {
    pub status: String,
    pub message: String,
}

/// POST /api/lab/launch — kick off one deployment pass. Returns 409 if a
/// pass is already in flight; concurrent passes are rejected, not queued.
pub async fn launch_lab(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<LaunchResponse>) {
    match state.supervisor.launch() {
        LaunchOutcome::Started => (
            StatusCode::ACCEPTED,
            Json(LaunchResponse {
                status: "launching".to_string(),
                message: "Lab deployment initiated".to_string(),
            }),
        ),
        LaunchOutcome::AlreadyRunning => (
            StatusCode::CONFLICT,
            Json(LaunchResponse {
                status: "already_running".to_string(),
                message: "Lab deployment is already in progress".to_string(),
            }),
        ),
    }
}

/// GET /api/lab/status — current deployment phase, for the UI to poll.
pub async fn lab_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.supervisor.status().as_str().to_string(),
    })
}

/// Healthcheck endpoint — returns 200 OK with status
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "rangelab",
    }))
}
