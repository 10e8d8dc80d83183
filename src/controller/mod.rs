mod client;
pub mod types;

pub use client::ControllerClient;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors from the controller REST API. The client never retries; retry
/// policy belongs to the caller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// The controller answered with a non-2xx status.
    #[error("controller returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// Transport-level failure (connection refused, timeout, DNS).
    #[error("controller unreachable: {0}")]
    Network(#[from] reqwest::Error),
}

impl ControllerError {
    /// The 409 the controller emits while the backing hypervisor holds a
    /// VM-file lock. The only retryable condition in the system.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ControllerError::Api { status, .. } if *status == StatusCode::CONFLICT)
    }
}
