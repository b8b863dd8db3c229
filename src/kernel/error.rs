use thiserror::Error;

use super::time::RangeError;
use crate::services::trim::ServiceFailure;

/// Terminal outcome of a failed trim attempt. None of these are retried
/// automatically; the user fixes the input and resubmits.
///
/// `Display` is the single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrimError {
    #[error("Please enter a video URL")]
    MissingInput,
    #[error("Invalid time stamps")]
    InvalidRange(#[from] RangeError),
    #[error("Error processing the video")]
    ServiceError { status: u16 },
    #[error("An error occurred")]
    TransportError(String),
    #[error("A trim is already in progress")]
    Busy,
    #[error("The trim was cancelled")]
    Cancelled,
}

impl TrimError {
    /// Underlying cause for logs; the `Display` text is kept for the user.
    pub fn detail(&self) -> String {
        match self {
            TrimError::InvalidRange(e) => e.to_string(),
            TrimError::ServiceError { status } => format!("service responded with status {}", status),
            TrimError::TransportError(cause) => cause.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ServiceFailure> for TrimError {
    fn from(failure: ServiceFailure) -> Self {
        match failure {
            ServiceFailure::Status(status) => TrimError::ServiceError { status },
            ServiceFailure::Transport(cause) => TrimError::TransportError(cause),
        }
    }
}
