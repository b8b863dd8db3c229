use serde::Serialize;

use super::time::TimeRange;

/// Payload sent to the trimming service.
///
/// Only built by the controller after the URL has been checked for emptiness
/// and the range validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrimRequest {
    #[serde(rename = "videoUrl")]
    pub source_url: String,
    #[serde(rename = "startTime")]
    pub start_seconds: u64,
    #[serde(rename = "endTime")]
    pub end_seconds: u64,
}

impl TrimRequest {
    pub fn new(source_url: impl Into<String>, range: TimeRange) -> Self {
        Self {
            source_url: source_url.into(),
            start_seconds: range.start(),
            end_seconds: range.end(),
        }
    }
}
