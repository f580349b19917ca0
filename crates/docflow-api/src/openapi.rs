//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docflow API — AI Document Pipeline",
        version = "0.3.2",
        description = "Document ingestion, GenAI invoice analysis, routing decisions, and external workflow triggering.\n\nPipeline: upload → analyze → route → (optional) feedback. Documents move forward through UPLOADED → PROCESSED → ANALYZED → ROUTED and never regress. Health probes (`/health/*`) and `/metrics` are unauthenticated.",
        license(name = "Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::documents::upload_document,
        crate::routes::documents::list_documents,
        crate::routes::documents::get_document,
        crate::routes::documents::analyze_document,
        crate::routes::documents::route_document,
        crate::routes::documents::submit_feedback,
        crate::routes::workflow::workflow_status,
        crate::routes::workflow::workflow_config,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::routes::documents::UploadJsonBody,
        crate::routes::documents::UploadResponse,
        crate::routes::documents::AnalyzeResponse,
        crate::routes::documents::RouteRequest,
        crate::routes::documents::RouteResponse,
        crate::routes::documents::FeedbackRequest,
        crate::routes::documents::FeedbackResponse,
        crate::routes::documents::DocumentSummary,
        crate::routes::documents::AnalysisView,
        crate::routes::documents::DocumentDetail,
        crate::routes::workflow::WorkflowStatusEntry,
        crate::routes::workflow::WorkflowConfigResponse,
    )),
    tags(
        (name = "documents", description = "Document pipeline: upload, analyze, route, feedback"),
        (name = "workflow", description = "Per-document workflow state and integration configuration"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

/// GET /openapi.json — The generated spec.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
