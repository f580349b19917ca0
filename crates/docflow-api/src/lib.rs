//! # docflow-api — Axum API Service for the Docflow Pipeline
//!
//! HTTP surface over the document pipeline: upload → AI analysis →
//! routing decision → external workflow trigger, with human feedback as
//! the correction loop.
//!
//! ## API Surface
//!
//! | Route                        | Module                  | Operation            |
//! |------------------------------|-------------------------|----------------------|
//! | `POST /documents`            | [`routes::documents`]   | Upload + ingest      |
//! | `GET /documents`             | [`routes::documents`]   | List with outcomes   |
//! | `GET /documents/:id`         | [`routes::documents`]   | Detail + analyses    |
//! | `POST /documents/:id/analyze`| [`routes::documents`]   | GenAI analysis       |
//! | `POST /documents/:id/route`  | [`routes::documents`]   | Rules + workflow     |
//! | `POST /documents/:id/feedback`| [`routes::documents`]  | Human correction     |
//! | `GET /workflow/status`       | [`routes::workflow`]    | Per-document state   |
//! | `GET /workflow/config`       | [`routes::workflow`]    | Integration status   |
//! | `GET /openapi.json`          | [`openapi`]             | Generated spec       |
//! | `GET /health/*`, `/metrics`  | (this module)           | Probes and scrape    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod error;
pub mod extract;
pub mod middleware;
pub mod openapi;
pub mod pipeline;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` sit outside the metrics
/// middleware so probe traffic does not pollute request metrics.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    // The body limit leaves headroom above the file ceiling for base64
    // expansion and multipart framing; exact size enforcement happens in
    // the pipeline with a domain-specific message.
    let api = Router::new()
        .merge(routes::documents::router())
        .merge(routes::workflow::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(state.config.max_file_size * 2))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(Extension(metrics.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .route("/metrics", axum::routing::get(prometheus_metrics))
        .layer(Extension(metrics))
        .with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus scrape endpoint.
///
/// Updates the domain gauges from the store on each scrape (pull model),
/// then encodes the registry in text exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let documents = state.store.documents();
    let ids: Vec<uuid::Uuid> = documents.iter().map(|d| d.id).collect();
    let mut analyses = 0usize;
    let mut awaiting_feedback = 0usize;
    for id in &ids {
        for analysis in state.store.analyses_for_document(*id) {
            analyses += 1;
            if analysis.feedback_required {
                awaiting_feedback += 1;
            }
        }
    }
    metrics.set_domain_gauges(documents.len(), analyses, awaiting_feedback);

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — 200 whenever the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the in-process collaborators respond.
///
/// Outbound integrations are intentionally not probed here: an
/// unconfigured GenAI endpoint or workflow binding degrades those
/// operations to configuration errors but the read surface stays up.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let _ = state.store.documents();
    let _ = state.rag.similarity_search("readiness", 1);
    (StatusCode::OK, "ready")
}
