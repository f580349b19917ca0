//! # Workflow Status API
//!
//! Per-document workflow state for dashboards: each entry joins a
//! document with its latest analysis's workflow instance and the derived
//! decision outcome. `/workflow/config` reports which outbound
//! integrations are configured; a `false` there means the corresponding
//! pipeline operation will fail fast with a configuration error.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use docflow_core::{derive_decision_outcome, DecisionOutcome};

use crate::routes::documents::decision_for;
use crate::state::AppState;

/// One document's workflow state, latest analysis rolled up.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatusEntry {
    pub document_id: Uuid,
    pub title: String,
    pub status: String,
    pub analysis_id: Option<Uuid>,
    pub workflow_instance_id: Option<String>,
    pub workflow_status: Option<String>,
    #[schema(value_type = Object)]
    pub outcome: DecisionOutcome,
}

/// Configuration status of the outbound integrations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfigResponse {
    /// Whether the GenAI inference endpoint is configured.
    pub genai_configured: bool,
    /// Whether the destination service binding is configured.
    pub workflow_configured: bool,
    /// The destination name the trigger chain resolves.
    pub destination_name: String,
    /// Path POSTed on the resolved destination.
    pub trigger_path: String,
}

/// Build the workflow router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/workflow/status", get(workflow_status))
        .route("/workflow/config", get(workflow_config))
}

/// GET /workflow/status — Workflow state per document, newest first.
#[utoipa::path(
    get,
    path = "/workflow/status",
    responses(
        (status = 200, description = "Per-document workflow state", body = Vec<WorkflowStatusEntry>),
    ),
    tag = "workflow"
)]
pub async fn workflow_status(State(state): State<AppState>) -> Json<Vec<WorkflowStatusEntry>> {
    let documents = state.store.documents();
    let ids: Vec<Uuid> = documents.iter().map(|d| d.id).collect();
    let latest = state.store.latest_analyses(&ids);

    let entries = documents
        .into_iter()
        .map(|document| {
            let analysis = latest.get(&document.id);
            let decision = analysis.map(|a| decision_for(a, &state));
            WorkflowStatusEntry {
                document_id: document.id,
                title: document.title,
                status: document.status.to_string(),
                analysis_id: analysis.map(|a| a.id),
                workflow_instance_id: analysis.and_then(|a| a.workflow_instance_id.clone()),
                workflow_status: analysis.and_then(|a| a.workflow_status.clone()),
                outcome: derive_decision_outcome(decision.as_ref()),
            }
        })
        .collect();

    Json(entries)
}

/// GET /workflow/config — Outbound integration configuration status.
#[utoipa::path(
    get,
    path = "/workflow/config",
    responses(
        (status = 200, description = "Integration configuration", body = WorkflowConfigResponse),
    ),
    tag = "workflow"
)]
pub async fn workflow_config(State(state): State<AppState>) -> Json<WorkflowConfigResponse> {
    Json(WorkflowConfigResponse {
        genai_configured: state.genai.is_configured(),
        workflow_configured: state.workflow.is_configured(),
        destination_name: state.config.workflow.destination_name.clone(),
        trigger_path: state.config.workflow.trigger_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use chrono::Utc;
    use docflow_core::{Analysis, AnalysisFields, AppConfig, Document, DocumentStatus};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_json(app: Router<()>, uri: &str) -> serde_json::Value {
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), axum::http::StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn document() -> Document {
        Document {
            id: Uuid::new_v4(),
            title: "Q1 invoice".to_string(),
            description: None,
            file_name: "invoice.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            file_size: 3,
            extracted_text: "text".to_string(),
            status: DocumentStatus::Processed,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn status_joins_documents_with_workflow_state() {
        let state = AppState::new(AppConfig::for_tests());
        let document = document();
        state.store.insert_document(document.clone());

        let fields = AnalysisFields {
            amount: Some(50_000.0),
            risk_level: Some("low".to_string()),
            ..Default::default()
        };
        let analysis = Analysis::new(document.id, "p".into(), "r".into(), fields, 0.8);
        state.store.insert_analysis(analysis.clone());
        state
            .store
            .attach_workflow_result(analysis.id, Some("wf-9".to_string()), "RUNNING".to_string())
            .unwrap();

        let app = router().with_state(state);
        let body = get_json(app, "/workflow/status").await;

        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["documentId"], document.id.to_string());
        assert_eq!(body[0]["title"], "Q1 invoice");
        assert_eq!(body[0]["analysisId"], analysis.id.to_string());
        assert_eq!(body[0]["workflowInstanceId"], "wf-9");
        assert_eq!(body[0]["workflowStatus"], "RUNNING");
        assert_eq!(body[0]["outcome"]["label"], "Finance Approval");
    }

    #[tokio::test]
    async fn status_without_analysis_is_pending() {
        let state = AppState::new(AppConfig::for_tests());
        state.store.insert_document(document());

        let app = router().with_state(state);
        let body = get_json(app, "/workflow/status").await;

        assert_eq!(body[0]["analysisId"], serde_json::Value::Null);
        assert_eq!(body[0]["workflowInstanceId"], serde_json::Value::Null);
        assert_eq!(body[0]["outcome"]["label"], "Pending Decision");
    }

    #[tokio::test]
    async fn config_reports_unconfigured_integrations() {
        let app = router().with_state(AppState::new(AppConfig::for_tests()));
        let body = get_json(app, "/workflow/config").await;

        assert_eq!(body["genaiConfigured"], false);
        assert_eq!(body["workflowConfigured"], false);
        assert_eq!(body["destinationName"], "workflow-engine");
    }
}
