pub mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::kernel::request::TrimRequest;

pub use client::HttpTrimService;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceFailure {
    /// The service answered with a non-2xx status. The body is not inspected.
    #[error("trim service returned status {0}")]
    Status(u16),
    /// Unreachable, timed out, or the body could not be read.
    #[error("trim service transport failure: {0}")]
    Transport(String),
}

/// The external trimming service. One call per submission, no retries.
#[async_trait]
pub trait TrimService: Send + Sync + 'static {
    /// Returns the raw audio payload on success.
    async fn trim(&self, request: &TrimRequest) -> Result<Vec<u8>, ServiceFailure>;
}
