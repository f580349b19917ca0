//! Workflow trigger client.
//!
//! Triggering the external workflow engine takes three network hops behind
//! two independent OAuth client-credentials exchanges:
//!
//! ```text
//! resolve binding (config, no I/O)
//!   → POST <auth_url>/oauth/token            (directory credentials)
//!   → GET  <service_url>/destination-configuration/v1/destinations/<name>
//!   → POST <token service URL>               (destination's own credentials)
//!   → POST <destination base URL><trigger path>
//! ```
//!
//! Any hop can fail independently; the chain aborts on the first failure
//! and the error names the endpoint, HTTP status, and response body. No
//! hop is retried here — that is the caller's decision.

use std::time::Duration;

use docflow_core::config::{DestinationBinding, WorkflowConfig};
use serde_json::Value;

use crate::body::read_speculative_json;
use crate::error::{upstream_message, ClientError};

/// Response field names an instance id may hide under, probed in order.
const INSTANCE_ID_FIELDS: &[&str] = &["id", "workflowInstanceId", "workflowId", "instanceId"];

/// Outcome of a successful trigger call.
#[derive(Debug, Clone)]
pub struct WorkflowTriggerResult {
    /// Instance id reported by the engine, when it reported one.
    pub instance_id: Option<String>,
    /// Engine-reported status, `"TRIGGERED"` when the response had none.
    pub status: String,
    /// The engine's parsed-or-raw response body.
    pub response: Value,
}

/// The target system's connection details, resolved from the destination
/// directory. Field casings in the directory payload vary by platform
/// version, so resolution is tolerant (see [`config_field`]).
#[derive(Debug, Clone)]
struct ResolvedDestination {
    base_url: String,
    client_id: String,
    client_secret: String,
    token_service_url: String,
}

/// Client for the chained destination-lookup → OAuth → trigger flow.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: reqwest::Client,
    config: WorkflowConfig,
}

impl WorkflowClient {
    /// Build a client with the configured per-hop timeout.
    pub fn new(config: WorkflowConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Whether a destination service binding is configured.
    pub fn is_configured(&self) -> bool {
        self.config.binding.is_some()
    }

    /// Run the full chain and POST `payload` to the workflow engine.
    pub async fn trigger(&self, payload: &Value) -> Result<WorkflowTriggerResult, ClientError> {
        let binding = self.binding()?;

        let directory_token = self
            .fetch_token(
                &oauth_token_endpoint(&binding.auth_url),
                &binding.client_id,
                &binding.client_secret,
            )
            .await?;

        let destination = self.lookup_destination(binding, &directory_token).await?;

        let target_token = self
            .fetch_token(
                &destination.token_service_url,
                &destination.client_id,
                &destination.client_secret,
            )
            .await?;

        self.post_trigger(&destination, &target_token, payload).await
    }

    /// Hop 0: the binding must exist before anything is attempted.
    fn binding(&self) -> Result<&DestinationBinding, ClientError> {
        self.config.binding.as_ref().ok_or_else(|| {
            ClientError::NotConfigured(
                "destination service binding is not configured".to_string(),
            )
        })
    }

    /// Client-credentials exchange against a token endpoint.
    ///
    /// Used twice with different credentials: once against the directory's
    /// authority, once against the destination's own token service.
    async fn fetch_token(
        &self,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .client
            .post(token_endpoint)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: token_endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Http {
            endpoint: token_endpoint.to_string(),
            source,
        })?;
        let body = read_speculative_json(&text);

        if !status.is_success() {
            return Err(ClientError::Api {
                endpoint: token_endpoint.to_string(),
                status: status.as_u16(),
                message: upstream_message(&body, "token request failed"),
                detail: body,
            });
        }

        match body.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => Ok(token.to_string()),
            _ => Err(ClientError::Unexpected {
                endpoint: token_endpoint.to_string(),
                message: "token response did not include access_token".to_string(),
                detail: body,
            }),
        }
    }

    /// Fetch the named destination's configuration from the directory.
    async fn lookup_destination(
        &self,
        binding: &DestinationBinding,
        token: &str,
    ) -> Result<ResolvedDestination, ClientError> {
        let endpoint = format!(
            "{}/destination-configuration/v1/destinations/{}",
            binding.service_url.trim_end_matches('/'),
            self.config.destination_name
        );

        let response = self
            .client
            .get(&endpoint)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;
        let body = read_speculative_json(&text);

        if !status.is_success() {
            return Err(ClientError::Api {
                endpoint,
                status: status.as_u16(),
                message: upstream_message(&body, "destination lookup failed"),
                detail: body,
            });
        }

        let Some(config) = body.get("destinationConfiguration") else {
            return Err(ClientError::Unexpected {
                endpoint,
                message: format!(
                    "destination {} has no destinationConfiguration payload",
                    self.config.destination_name
                ),
                detail: body,
            });
        };

        let base_url = config_field(config, &["URL", "url", "Url"]);
        let client_id = config_field(config, &["clientId", "clientid", "ClientId", "client_id"]);
        let client_secret = config_field(
            config,
            &["clientSecret", "clientsecret", "ClientSecret", "client_secret"],
        );
        let token_service_url = config_field(
            config,
            &[
                "tokenServiceURL",
                "tokenServiceUrl",
                "tokenserviceurl",
                "token_service_url",
            ],
        );

        match (base_url, client_id, client_secret, token_service_url) {
            (Some(base_url), Some(client_id), Some(client_secret), Some(token_service_url)) => {
                Ok(ResolvedDestination {
                    base_url,
                    client_id,
                    client_secret,
                    token_service_url,
                })
            }
            (None, ..) => Err(ClientError::NotConfigured(format!(
                "destination {} has no URL configured",
                self.config.destination_name
            ))),
            _ => Err(ClientError::NotConfigured(format!(
                "destination {} has an incomplete OAuth client configuration",
                self.config.destination_name
            ))),
        }
    }

    /// Final hop: POST the workflow payload to the resolved target.
    async fn post_trigger(
        &self,
        destination: &ResolvedDestination,
        token: &str,
        payload: &Value,
    ) -> Result<WorkflowTriggerResult, ClientError> {
        let endpoint = join_url(&destination.base_url, &self.config.trigger_path);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|source| ClientError::Http {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| ClientError::Http {
            endpoint: endpoint.clone(),
            source,
        })?;
        let body = read_speculative_json(&text);

        if !status.is_success() {
            return Err(ClientError::Api {
                endpoint,
                status: status.as_u16(),
                message: upstream_message(&body, "workflow trigger failed"),
                detail: body,
            });
        }

        let instance_id = INSTANCE_ID_FIELDS.iter().find_map(|f| match body.get(*f) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        });
        let workflow_status = body
            .get("status")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or("TRIGGERED")
            .to_string();

        tracing::info!(
            instance_id = instance_id.as_deref().unwrap_or("<none>"),
            status = %workflow_status,
            "workflow triggered"
        );

        Ok(WorkflowTriggerResult {
            instance_id,
            status: workflow_status,
            response: body,
        })
    }
}

/// First non-empty string field under any of the accepted casings.
fn config_field(config: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| config.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Token endpoints hang off the authority base URL.
fn oauth_token_endpoint(auth_url: &str) -> String {
    format!("{}/oauth/token", auth_url.trim_end_matches('/'))
}

/// Join a base URL and path, normalizing the slash between them.
fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
