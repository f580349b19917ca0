//! Client error types.

use serde_json::Value;

/// Errors from outbound HTTP calls.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required endpoint or credential is missing. Raised before any
    /// network call is attempted.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// HTTP transport error (connect failure, timeout).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The upstream returned a non-2xx status. `detail` carries the
    /// parsed-or-raw response body for diagnostics.
    #[error("{endpoint} returned {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
        detail: Value,
    },

    /// The upstream returned 2xx but the payload is missing something the
    /// chain cannot proceed without (e.g. a token response with no
    /// `access_token`).
    #[error("unexpected response from {endpoint}: {message}")]
    Unexpected {
        endpoint: String,
        message: String,
        detail: Value,
    },
}

impl ClientError {
    /// The upstream HTTP status, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of a parsed upstream error body,
/// falling back to the supplied default.
pub(crate) fn upstream_message(body: &Value, fallback: &str) -> String {
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}
