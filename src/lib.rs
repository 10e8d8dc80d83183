pub mod config;
pub mod controller;
pub mod handlers;
pub mod lab;
pub mod lockclear;
pub mod orchestrator;
pub mod router;
pub mod run;

use std::sync::Arc;

use run::Supervisor;

/// Application state shared across handlers
pub struct AppState {
    pub supervisor: Arc<Supervisor>,
}
