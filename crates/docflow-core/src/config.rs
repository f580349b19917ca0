//! Immutable application configuration.
//!
//! Built once at startup from the environment and passed into each
//! component constructor. Thresholds are fields here, not constants —
//! the routing engine and feedback gating receive them as inputs.

use std::env;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

/// Configuration parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that failed to parse.
    #[error("invalid value for {var}: {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Inference service endpoint configuration.
///
/// `api_url` is optional: without it the analyze operation fails fast with
/// a configuration error, before any network call.
#[derive(Debug, Clone, Default)]
pub struct GenAiConfig {
    /// `GENAI_API_URL` — inference endpoint. None means unconfigured.
    pub api_url: Option<String>,
    /// `GENAI_API_KEY` — optional bearer credential.
    pub api_key: Option<String>,
    /// `GENAI_MODEL` — model identifier sent in the request body.
    pub model: String,
    /// `GENAI_TIMEOUT_SECS` — per-request timeout (default 30).
    pub timeout_secs: u64,
}

/// Thresholds driving the routing verdict and feedback gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingPolicy {
    /// `AMOUNT_APPROVAL_THRESHOLD` — amounts strictly above this require review.
    pub amount_threshold: f64,
    /// `HIGH_RISK_LEVELS` — risk level names (compared case-insensitively).
    pub high_risk_levels: Vec<String>,
    /// `FEEDBACK_CONFIDENCE_THRESHOLD` — analyses below this confidence
    /// (or with no confidence at all) are flagged for human correction.
    pub confidence_threshold: f64,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            amount_threshold: 10_000.0,
            high_risk_levels: vec!["high".to_string(), "critical".to_string()],
            confidence_threshold: 0.8,
        }
    }
}

/// Credentials and base URLs for the destination directory service.
///
/// The binding authenticates against the token-issuing authority
/// (`auth_url`) and reads destination configurations from `service_url`.
/// In platform deployments these come from the service binding injected
/// into the environment.
#[derive(Debug, Clone)]
pub struct DestinationBinding {
    pub client_id: String,
    pub client_secret: String,
    /// OAuth authority base URL; `/oauth/token` is appended for the grant.
    pub auth_url: String,
    /// Destination directory API base URL.
    pub service_url: String,
}

/// Workflow trigger configuration: which destination to resolve and where
/// to POST once resolved.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Directory service binding. None means routing is unconfigured and
    /// trigger attempts fail fast.
    pub binding: Option<DestinationBinding>,
    /// `WORKFLOW_DESTINATION_NAME` — named destination to look up.
    pub destination_name: String,
    /// `WORKFLOW_TRIGGER_PATH` — path appended to the destination base URL.
    pub trigger_path: String,
    /// `DESTINATION_TIMEOUT_SECS` — per-hop timeout (default 30).
    pub timeout_secs: u64,
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `DOCFLOW_BIND` — listen address (default 127.0.0.1:8080).
    pub bind_addr: SocketAddr,
    /// `DOCUMENT_MAX_SIZE` — upload size ceiling in bytes (default 10 MiB).
    pub max_file_size: usize,
    /// `ALLOWED_MIME_TYPES` — comma-separated allow-list (default application/pdf).
    pub allowed_mime_types: Vec<String>,
    pub genai: GenAiConfig,
    pub routing: RoutingPolicy,
    pub workflow: WorkflowConfig,
}

const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

impl AppConfig {
    /// Read the full configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = parse_var("DOCFLOW_BIND", "127.0.0.1:8080")?;
        let max_file_size = parse_var("DOCUMENT_MAX_SIZE", &DEFAULT_MAX_FILE_SIZE.to_string())?;
        let allowed_mime_types = csv_var("ALLOWED_MIME_TYPES", "application/pdf");

        let genai = GenAiConfig {
            api_url: env::var("GENAI_API_URL").ok().filter(|v| !v.is_empty()),
            api_key: env::var("GENAI_API_KEY").ok().filter(|v| !v.is_empty()),
            model: env::var("GENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            timeout_secs: parse_var("GENAI_TIMEOUT_SECS", "30")?,
        };

        let routing = RoutingPolicy {
            amount_threshold: parse_var("AMOUNT_APPROVAL_THRESHOLD", "10000")?,
            high_risk_levels: csv_var("HIGH_RISK_LEVELS", "high,critical"),
            confidence_threshold: parse_var("FEEDBACK_CONFIDENCE_THRESHOLD", "0.8")?,
        };

        let workflow = WorkflowConfig {
            binding: destination_binding_from_env(),
            destination_name: env::var("WORKFLOW_DESTINATION_NAME")
                .unwrap_or_else(|_| "workflow-engine".to_string()),
            trigger_path: env::var("WORKFLOW_TRIGGER_PATH")
                .unwrap_or_else(|_| "/v1/workflow-instances".to_string()),
            timeout_secs: parse_var("DESTINATION_TIMEOUT_SECS", "30")?,
        };

        Ok(Self {
            bind_addr,
            max_file_size,
            allowed_mime_types,
            genai,
            routing,
            workflow,
        })
    }

    /// In-process defaults for tests: everything local, nothing configured
    /// that would reach the network.
    pub fn for_tests() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".parse().expect("literal addr"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: vec!["application/pdf".to_string(), "text/plain".to_string()],
            genai: GenAiConfig {
                model: "test-model".to_string(),
                timeout_secs: 5,
                ..Default::default()
            },
            routing: RoutingPolicy::default(),
            workflow: WorkflowConfig {
                binding: None,
                destination_name: "workflow-engine".to_string(),
                trigger_path: "/v1/workflow-instances".to_string(),
                timeout_secs: 5,
            },
        }
    }
}

/// The binding exists only when all four credentials are present. A partial
/// binding is treated as absent so trigger attempts surface one clear
/// configuration error instead of a confusing mid-chain auth failure.
fn destination_binding_from_env() -> Option<DestinationBinding> {
    let client_id = env::var("DESTINATION_CLIENT_ID").ok().filter(|v| !v.is_empty())?;
    let client_secret = env::var("DESTINATION_CLIENT_SECRET").ok().filter(|v| !v.is_empty())?;
    let auth_url = env::var("DESTINATION_AUTH_URL").ok().filter(|v| !v.is_empty())?;
    let service_url = env::var("DESTINATION_SERVICE_URL").ok().filter(|v| !v.is_empty())?;
    Some(DestinationBinding {
        client_id,
        client_secret,
        auth_url,
        service_url,
    })
}

fn parse_var<T>(var: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(var).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: raw,
        reason: e.to_string(),
    })
}

fn csv_var(var: &str, default: &str) -> Vec<String> {
    env::var(var)
        .unwrap_or_else(|_| default.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
