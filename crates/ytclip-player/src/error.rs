//! Error types for player operations.

use thiserror::Error;

/// Result type for player operations.
pub type PlayerResult<T> = Result<T, PlayerError>;

/// Errors raised while acquiring the embed API or creating a player.
///
/// Once a player exists, its operations do not fail: calls against a
/// destroyed or missing instance are no-ops.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player API unavailable: {0}")]
    ApiUnavailable(String),

    #[error("Failed to create player in '{container_id}': {message}")]
    CreateFailed { container_id: String, message: String },
}

impl PlayerError {
    pub fn api_unavailable(msg: impl Into<String>) -> Self {
        Self::ApiUnavailable(msg.into())
    }

    pub fn create_failed(container_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CreateFailed {
            container_id: container_id.into(),
            message: message.into(),
        }
    }
}
