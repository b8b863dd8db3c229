use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{ServiceFailure, TrimService};
use crate::config::ClipdeckConfig;
use crate::kernel::request::TrimRequest;

#[derive(Clone)]
pub struct HttpTrimService {
    client: Client,
    endpoint: String,
}

impl HttpTrimService {
    pub fn new(config: &ClipdeckConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            endpoint: config.endpoint.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TrimService for HttpTrimService {
    async fn trim(&self, request: &TrimRequest) -> Result<Vec<u8>, ServiceFailure> {
        debug!(endpoint = %self.endpoint, start = request.start_seconds, end = request.end_seconds, "Posting trim request");

        // `.json` sets Content-Type: application/json
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceFailure::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceFailure::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ServiceFailure::Transport(e.to_string()))?;
        debug!(bytes = body.len(), "Trim response received");
        Ok(body.to_vec())
    }
}
