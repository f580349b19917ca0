//! GenAI inference client.

use std::time::Duration;

use docflow_core::GenAiConfig;
use serde_json::{json, Value};

use crate::body::read_speculative_json;
use crate::error::{upstream_message, ClientError};

/// Raw plus speculatively-parsed inference response.
#[derive(Debug, Clone)]
pub struct GenAiResponse {
    /// The response body exactly as received.
    pub raw_text: String,
    /// Best-effort JSON view of the body.
    pub body: Value,
}

/// HTTP client for the configured inference endpoint.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    client: reqwest::Client,
    config: GenAiConfig,
}

impl GenAiClient {
    /// Build a client with the configured per-request timeout.
    pub fn new(config: GenAiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Whether an inference endpoint is configured at all.
    pub fn is_configured(&self) -> bool {
        self.config.api_url.is_some()
    }

    /// Issue one inference request.
    ///
    /// Fails fast with [`ClientError::NotConfigured`] when no endpoint URL
    /// is set. A non-2xx response is a hard error carrying the status and
    /// the parsed-or-raw body; a 2xx response is returned as-is, however
    /// malformed — interpretation is the caller's job.
    pub async fn analyze(&self, prompt: &str, input: &str) -> Result<GenAiResponse, ClientError> {
        let url = self.config.api_url.as_deref().ok_or_else(|| {
            ClientError::NotConfigured("GENAI_API_URL is not configured".to_string())
        })?;

        let payload = json!({
            "model": self.config.model,
            "prompt": prompt,
            "input": input,
        });

        let mut request = self.client.post(url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|source| ClientError::Http {
            endpoint: url.to_string(),
            source,
        })?;

        let status = response.status();
        let raw_text = response.text().await.map_err(|source| ClientError::Http {
            endpoint: url.to_string(),
            source,
        })?;
        let body = read_speculative_json(&raw_text);

        if !status.is_success() {
            return Err(ClientError::Api {
                endpoint: url.to_string(),
                status: status.as_u16(),
                message: upstream_message(&body, "GenAI request failed"),
                detail: body,
            });
        }

        tracing::debug!(model = %self.config.model, bytes = raw_text.len(), "GenAI response received");
        Ok(GenAiResponse { raw_text, body })
    }
}
