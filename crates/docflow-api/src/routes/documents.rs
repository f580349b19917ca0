//! # Document Pipeline API
//!
//! Upload, analyze, route, and feedback endpoints plus the read surface.
//! Handlers translate HTTP framing into [`crate::pipeline`] calls; all
//! pipeline semantics (validation messages, lifecycle transitions, analysis
//! resolution) live there.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use docflow_core::routing::evaluate_routing_rules;
use docflow_core::{
    derive_decision_outcome, Analysis, DecisionOutcome, Document, RoutingDecision,
};

use crate::error::AppError;
use crate::pipeline::{self, UploadPayload};
use crate::state::AppState;

/// JSON upload body: base64 file content plus optional metadata. The
/// multipart form carries the same information as `file`, `title`, and
/// `description` parts.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadJsonBody {
    /// Base64-encoded file content.
    pub data: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Created-document response. Callers read the extracted content from
/// `text`; `extractedText` duplicates it alongside the richer metadata.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub id: Uuid,
    pub text: String,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub status: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
}

/// Analysis response: the parsed fields, flattened, and the feedback gate.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis_id: Uuid,
    pub document_id: Uuid,
    pub amount: Option<f64>,
    pub vendor: Option<String>,
    pub date: Option<chrono::NaiveDate>,
    pub risk_level: Option<String>,
    pub confidence: Option<f64>,
    pub feedback_required: bool,
    pub created_at: DateTime<Utc>,
}

/// Routing request: optionally pin a specific analysis instead of the latest.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub analysis_id: Option<Uuid>,
}

/// Routing response: the verdict and what the workflow engine reported.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub document_id: Uuid,
    pub analysis_id: Uuid,
    pub workflow_instance_id: Option<String>,
    pub workflow_status: String,
    #[schema(value_type = Object)]
    pub routing_decision: RoutingDecision,
    /// The engine's response body, parsed or `{"raw": <text>}`.
    #[schema(value_type = Object)]
    pub workflow_response: Value,
}

/// Feedback request against a document's analysis.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Analysis to correct; the document's latest when omitted.
    pub analysis_id: Option<Uuid>,
    /// Corrected values: a string or structured JSON. Required.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub corrections: Value,
    pub comments: Option<String>,
    pub submitted_by: Option<String>,
}

/// Feedback acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub analysis_id: Uuid,
    pub document_id: Uuid,
    pub message: String,
}

/// One document in the list view, with its latest analysis rolled up.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: Uuid,
    pub title: String,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub latest_analysis_id: Option<Uuid>,
    pub feedback_required: Option<bool>,
    #[schema(value_type = Object)]
    pub outcome: DecisionOutcome,
}

/// One analysis in the detail view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    pub id: Uuid,
    #[schema(value_type = Object)]
    pub fields: docflow_core::AnalysisFields,
    pub feedback_required: bool,
    pub feedback_provided: bool,
    pub workflow_instance_id: Option<String>,
    pub workflow_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Full document detail: text, analyses (newest first), derived outcome.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub status: String,
    pub extracted_text: String,
    pub created_at: DateTime<Utc>,
    pub analyses: Vec<AnalysisView>,
    #[schema(value_type = Object)]
    pub routing_preview: Option<RoutingDecision>,
    #[schema(value_type = Object)]
    pub outcome: DecisionOutcome,
}

/// Build the documents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/documents", get(list_documents).post(upload_document))
        .route("/documents/:id", get(get_document))
        .route("/documents/:id/analyze", post(analyze_document))
        .route("/documents/:id/route", post(route_document))
        .route("/documents/:id/feedback", post(submit_feedback))
}

/// POST /documents — Upload a document.
///
/// Accepts either `multipart/form-data` (a `file` part plus optional
/// `title` and `description` parts) or a JSON body with base64 `data`.
/// The upload is validated, its text extracted, and the document stored
/// in `PROCESSED` state.
#[utoipa::path(
    post,
    path = "/documents",
    request_body = UploadJsonBody,
    responses(
        (status = 201, description = "Document ingested", body = UploadResponse),
        (status = 400, description = "Rejected upload", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn upload_document(
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let payload = decode_upload(&state, request).await?;
    let document = pipeline::ingest_document(&state, payload)?;
    Ok((StatusCode::CREATED, Json(upload_response(document))))
}

/// Decode the transport framing into one [`UploadPayload`].
async fn decode_upload(state: &AppState, request: Request) -> Result<UploadPayload, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| AppError::Validation(format!("invalid multipart request: {e}")))?;
        decode_multipart(multipart).await
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), state.config.max_file_size * 2)
            .await
            .map_err(|e| AppError::Validation(format!("unreadable request body: {e}")))?;
        let body: UploadJsonBody = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::Validation(format!("invalid upload payload: {e}")))?;
        decode_json_upload(body)
    }
}

async fn decode_multipart(mut multipart: Multipart) -> Result<UploadPayload, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut title = None;
    let mut description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart request: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("document.pdf")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file part: {e}")))?;
                file = Some((file_name, mime_type, bytes.to_vec()));
            }
            "title" => title = field.text().await.ok().filter(|t| !t.is_empty()),
            "description" => description = field.text().await.ok().filter(|d| !d.is_empty()),
            _ => {}
        }
    }

    let (file_name, mime_type, bytes) = file
        .ok_or_else(|| AppError::Validation("File payload is required".to_string()))?;

    Ok(UploadPayload {
        file_name,
        mime_type,
        title,
        description,
        bytes,
    })
}

fn decode_json_upload(body: UploadJsonBody) -> Result<UploadPayload, AppError> {
    let bytes = BASE64
        .decode(body.data.as_bytes())
        .map_err(|_| AppError::Validation("Invalid base64 file data".to_string()))?;

    Ok(UploadPayload {
        file_name: body
            .file_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "document.pdf".to_string()),
        mime_type: body
            .mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "application/pdf".to_string()),
        title: body.title,
        description: body.description,
        bytes,
    })
}

/// POST /documents/:id/analyze — Run AI analysis over a document.
///
/// Re-analysis is permitted: every call creates a fresh analysis record.
#[utoipa::path(
    post,
    path = "/documents/{id}/analyze",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Analysis created", body = AnalyzeResponse),
        (status = 400, description = "No extracted text", body = crate::error::ErrorBody),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
        (status = 500, description = "Inference endpoint unconfigured", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn analyze_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis = pipeline::analyze_document(&state, id).await?;
    Ok(Json(AnalyzeResponse {
        analysis_id: analysis.id,
        document_id: analysis.document_id,
        amount: analysis.fields.amount,
        vendor: analysis.fields.vendor,
        date: analysis.fields.date,
        risk_level: analysis.fields.risk_level,
        confidence: analysis.fields.confidence,
        feedback_required: analysis.feedback_required,
        created_at: analysis.created_at,
    }))
}

/// POST /documents/:id/route — Evaluate routing rules and trigger the
/// workflow engine.
#[utoipa::path(
    post,
    path = "/documents/{id}/route",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = RouteRequest,
    responses(
        (status = 200, description = "Document routed", body = RouteResponse),
        (status = 404, description = "Document or analysis not found", body = crate::error::ErrorBody),
        (status = 500, description = "Workflow binding unconfigured", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn route_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<RouteRequest>>,
) -> Result<Json<RouteResponse>, AppError> {
    let analysis_id = body.and_then(|Json(req)| req.analysis_id);
    let routed = pipeline::route_document(&state, id, analysis_id).await?;
    Ok(Json(RouteResponse {
        document_id: routed.document_id,
        analysis_id: routed.analysis_id,
        workflow_instance_id: routed.workflow.instance_id,
        workflow_status: routed.workflow.status,
        routing_decision: routed.decision,
        workflow_response: routed.workflow.response,
    }))
}

/// POST /documents/:id/feedback — Record a human correction.
#[utoipa::path(
    post,
    path = "/documents/{id}/feedback",
    params(("id" = Uuid, Path, description = "Document ID")),
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback recorded", body = FeedbackResponse),
        (status = 400, description = "Missing corrections", body = crate::error::ErrorBody),
        (status = 404, description = "Document or analysis not found", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), AppError> {
    let feedback = pipeline::submit_feedback(
        &state,
        id,
        req.analysis_id,
        &req.corrections,
        req.comments,
        req.submitted_by,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            analysis_id: feedback.analysis_id,
            document_id: id,
            message: "Feedback received".to_string(),
        }),
    ))
}

/// GET /documents — List documents, newest first, with rolled-up outcomes.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "Documents", body = Vec<DocumentSummary>),
    ),
    tag = "documents"
)]
pub async fn list_documents(State(state): State<AppState>) -> Json<Vec<DocumentSummary>> {
    let documents = state.store.documents();
    let ids: Vec<Uuid> = documents.iter().map(|d| d.id).collect();
    let latest = state.store.latest_analyses(&ids);

    let summaries = documents
        .into_iter()
        .map(|document| {
            let analysis = latest.get(&document.id);
            let decision = analysis.map(|a| decision_for(a, &state));
            DocumentSummary {
                id: document.id,
                title: document.title,
                file_name: document.file_name,
                mime_type: document.mime_type,
                file_size: document.file_size,
                status: document.status.to_string(),
                created_at: document.created_at,
                latest_analysis_id: analysis.map(|a| a.id),
                feedback_required: analysis.map(|a| a.feedback_required),
                outcome: derive_decision_outcome(decision.as_ref()),
            }
        })
        .collect();

    Json(summaries)
}

/// GET /documents/:id — Document detail with analyses and derived outcome.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document ID")),
    responses(
        (status = 200, description = "Document detail", body = DocumentDetail),
        (status = 404, description = "Document not found", body = crate::error::ErrorBody),
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentDetail>, AppError> {
    let document = state
        .store
        .document(id)
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let analyses = state.store.analyses_for_document(id);
    let routing_preview = analyses.first().map(|a| decision_for(a, &state));

    let views = analyses
        .into_iter()
        .map(|a| AnalysisView {
            id: a.id,
            fields: a.fields,
            feedback_required: a.feedback_required,
            feedback_provided: a.feedback_provided,
            workflow_instance_id: a.workflow_instance_id,
            workflow_status: a.workflow_status,
            created_at: a.created_at,
        })
        .collect();

    Ok(Json(DocumentDetail {
        id: document.id,
        title: document.title,
        description: document.description,
        file_name: document.file_name,
        mime_type: document.mime_type,
        file_size: document.file_size,
        status: document.status.to_string(),
        extracted_text: document.extracted_text,
        created_at: document.created_at,
        analyses: views,
        outcome: derive_decision_outcome(routing_preview.as_ref()),
        routing_preview,
    }))
}

/// Recompute the routing decision an analysis would receive today. The
/// decision is never persisted, so reads derive it from current policy.
pub(crate) fn decision_for(analysis: &Analysis, state: &AppState) -> RoutingDecision {
    evaluate_routing_rules(
        analysis.fields.amount,
        analysis.fields.risk_level.as_deref(),
        &state.config.routing,
    )
}

fn upload_response(document: Document) -> UploadResponse {
    UploadResponse {
        id: document.id,
        text: document.extracted_text.clone(),
        title: document.title,
        file_name: document.file_name,
        mime_type: document.mime_type,
        file_size: document.file_size,
        status: document.status.to_string(),
        extracted_text: document.extracted_text,
        created_at: document.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use docflow_core::AppConfig;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_app() -> Router<()> {
        router().with_state(AppState::new(AppConfig::for_tests()))
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn upload_request(payload: Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/documents")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap()
    }

    fn base64_of(text: &str) -> String {
        BASE64.encode(text.as_bytes())
    }

    #[tokio::test]
    async fn upload_json_returns_201_with_extracted_text() {
        let app = test_app();
        let resp = app
            .oneshot(upload_request(json!({
                "data": base64_of("Invoice   total: 42"),
                "fileName": "inv.txt",
                "mimeType": "text/plain",
            })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body = body_json(resp).await;
        assert_eq!(body["fileName"], "inv.txt");
        assert_eq!(body["status"], "PROCESSED");
        assert_eq!(body["text"], "Invoice total: 42");
        assert_eq!(body["extractedText"], "Invoice total: 42");
    }

    #[tokio::test]
    async fn upload_disallowed_mime_returns_400_envelope() {
        let app = test_app();
        let resp = app
            .oneshot(upload_request(json!({
                "data": base64_of("x"),
                "mimeType": "image/png",
            })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Unsupported file type");
    }

    #[tokio::test]
    async fn upload_invalid_base64_returns_400() {
        let app = test_app();
        let resp = app
            .oneshot(upload_request(json!({
                "data": "not base64!!!",
                "mimeType": "text/plain",
            })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid base64 file data");
    }

    #[tokio::test]
    async fn get_unknown_document_returns_404() {
        let app = test_app();
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .method("GET")
                    .uri(format!("/documents/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "Document not found");
    }

    #[tokio::test]
    async fn list_reflects_uploads_with_pending_outcome() {
        let state = AppState::new(AppConfig::for_tests());
        let app = router().with_state(state);

        let resp = app
            .clone()
            .oneshot(upload_request(json!({
                "data": base64_of("hello"),
                "mimeType": "text/plain",
            })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .method("GET")
                    .uri("/documents")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["outcome"]["label"], "Pending Decision");
        assert_eq!(body[0]["latestAnalysisId"], Value::Null);
    }

    #[tokio::test]
    async fn feedback_without_analysis_returns_404() {
        let state = AppState::new(AppConfig::for_tests());
        let app = router().with_state(state);

        let resp = app
            .clone()
            .oneshot(upload_request(json!({
                "data": base64_of("text"),
                "mimeType": "text/plain",
            })))
            .await
            .unwrap();
        let id = body_json(resp).await["id"].as_str().unwrap().to_string();

        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri(format!("/documents/{id}/feedback"))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"corrections": "fix"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(resp).await["error"],
            "No analysis found for this document"
        );
    }
}
