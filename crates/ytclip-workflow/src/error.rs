//! Workflow error types.

use thiserror::Error;
use ytclip_models::ShareError;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors surfaced to the user. All are recoverable; the workflow stays usable.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Please enter a YouTube video URL.")]
    EmptyInput,

    #[error("Invalid YouTube URL. Please check and try again.")]
    InvalidUrl,

    #[error("Invalid time '{0}'. Use MM:SS.")]
    InvalidTimeText(String),

    #[error("The clip start must be before its end.")]
    IneligibleBoundary,

    #[error("Invalid share configuration: {0}")]
    Share(#[from] ShareError),
}

impl WorkflowError {
    /// Whether the message should be kept as the workflow's last error.
    ///
    /// Edit failures are reported by reverting the field instead.
    pub fn is_reported(&self) -> bool {
        matches!(self, WorkflowError::EmptyInput | WorkflowError::InvalidUrl)
    }
}
