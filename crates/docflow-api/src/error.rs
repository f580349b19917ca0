//! # API Error Types
//!
//! Tagged error type carrying an explicit kind (Validation / NotFound /
//! Configuration / Upstream) and, for upstream failures, the status the
//! remote returned. Implements `axum::response::IntoResponse`, so every
//! handler propagates with `?` and the boundary renders the JSON envelope
//! `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use docflow_client::ClientError;
use docflow_store::StoreError;

/// JSON error envelope returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable failure message.
    pub error: String,
}

/// Application-level error mapped to HTTP at the request boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// The caller sent something unusable (400). Recoverable by fixing
    /// the input.
    #[error("{0}")]
    Validation(String),

    /// Unknown document or analysis id (404).
    #[error("{0}")]
    NotFound(String),

    /// Missing or incomplete service configuration (500). Fatal until an
    /// operator fixes it; never retried automatically.
    #[error("{0}")]
    Configuration(String),

    /// A downstream service failed. Propagates the upstream HTTP status
    /// when one exists, 500 otherwise.
    #[error("{message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

impl AppError {
    /// HTTP status this error renders as.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Operator visibility for server-side failures.
        match &self {
            Self::Configuration(_) => tracing::error!(error = %self, "configuration error"),
            Self::Upstream { .. } => tracing::error!(error = %self, "upstream failure"),
            _ => {}
        }

        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotConfigured(msg) => Self::Configuration(msg),
            ClientError::Api {
                status, message, ..
            } => Self::Upstream {
                status: Some(status),
                message,
            },
            other @ (ClientError::Http { .. } | ClientError::Unexpected { .. }) => {
                Self::Upstream {
                    status: None,
                    message: other.to_string(),
                }
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::StatusRegression { .. } => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn response_parts(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_renders_400_envelope() {
        let (status, body) = response_parts(AppError::Validation("File is empty".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File is empty");
    }

    #[tokio::test]
    async fn not_found_renders_404() {
        let (status, body) = response_parts(AppError::NotFound("Document not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Document not found");
    }

    #[tokio::test]
    async fn configuration_renders_500() {
        let (status, _) =
            response_parts(AppError::Configuration("GENAI_API_URL is not configured".into()))
                .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn upstream_propagates_remote_status() {
        let (status, body) = response_parts(AppError::Upstream {
            status: Some(502),
            message: "boom".into(),
        })
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "boom");
    }

    #[tokio::test]
    async fn upstream_without_status_renders_500() {
        let (status, _) = response_parts(AppError::Upstream {
            status: None,
            message: "connection refused".into(),
        })
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_map_by_kind() {
        let err: AppError = ClientError::NotConfigured("x".into()).into();
        assert!(matches!(err, AppError::Configuration(_)));

        let err: AppError = ClientError::Api {
            endpoint: "e".into(),
            status: 503,
            message: "down".into(),
            detail: Value::Null,
        }
        .into();
        match err {
            AppError::Upstream { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn invalid_upstream_status_falls_back_to_500() {
        let err = AppError::Upstream {
            status: Some(42),
            message: "odd".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
