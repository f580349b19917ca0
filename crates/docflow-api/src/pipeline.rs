//! # Pipeline Orchestrator
//!
//! The four pipeline operations, independent of HTTP framing: ingest,
//! analyze, route, feedback. Handlers in [`crate::routes`] translate
//! requests into these calls and render the results; everything between
//! the request boundary and the collaborators happens here.
//!
//! Each operation advances the owning document's lifecycle through the
//! store's forward-only status update, so re-running an operation on an
//! already-advanced document never regresses it.

use std::time::Instant;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use docflow_client::{parse_analysis_result, WorkflowTriggerResult};
use docflow_core::routing::evaluate_routing_rules;
use docflow_core::{
    build_analysis_prompt, Analysis, Document, DocumentStatus, Feedback, RoutingDecision,
};

use crate::error::AppError;
use crate::state::AppState;

/// An upload after transport decoding: raw bytes plus caller metadata.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub file_name: String,
    pub mime_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub bytes: Vec<u8>,
}

/// Outcome of routing one document through the workflow engine.
#[derive(Debug, Clone)]
pub struct RoutedDocument {
    pub document_id: Uuid,
    pub analysis_id: Uuid,
    pub decision: RoutingDecision,
    pub workflow: WorkflowTriggerResult,
}

/// Reject uploads the pipeline will not accept before any work is done.
pub fn validate_payload(state: &AppState, payload: &UploadPayload) -> Result<(), AppError> {
    let allowed = state
        .config
        .allowed_mime_types
        .iter()
        .any(|m| m.eq_ignore_ascii_case(&payload.mime_type));
    if !allowed {
        return Err(AppError::Validation("Unsupported file type".to_string()));
    }
    if payload.bytes.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    if payload.bytes.len() > state.config.max_file_size {
        return Err(AppError::Validation(
            "File exceeds maximum allowed size".to_string(),
        ));
    }
    Ok(())
}

/// Ingest one upload: validate, extract text, persist the document, and
/// index the text for similarity search. The document lands in
/// `PROCESSED` state with its extracted text attached.
pub fn ingest_document(state: &AppState, payload: UploadPayload) -> Result<Document, AppError> {
    validate_payload(state, &payload)?;

    let extracted_text = state
        .extractor
        .extract(&payload.bytes, &payload.mime_type)
        .map_err(AppError::Validation)?;

    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| payload.file_name.clone());

    let document = Document {
        id: Uuid::new_v4(),
        title,
        description: payload.description.filter(|d| !d.trim().is_empty()),
        file_name: payload.file_name,
        mime_type: payload.mime_type,
        file_size: payload.bytes.len() as u64,
        extracted_text,
        status: DocumentStatus::Uploaded,
        created_at: Utc::now(),
    };

    state.store.insert_document(document.clone());

    if !document.extracted_text.is_empty() {
        state.rag.upsert_embeddings(
            document.id,
            vec![(
                document.extracted_text.clone(),
                json!({
                    "fileName": document.file_name,
                    "mimeType": document.mime_type,
                }),
            )],
        );
    }

    state
        .store
        .update_document_status(document.id, DocumentStatus::Processed)?;

    tracing::info!(
        document_id = %document.id,
        file_name = %document.file_name,
        size = document.file_size,
        "document ingested"
    );

    Ok(state.store.document(document.id).unwrap_or(document))
}

/// Analyze a document's extracted text through the inference service.
///
/// Always creates a fresh analysis record; re-analysis is permitted and
/// never overwrites earlier runs.
pub async fn analyze_document(state: &AppState, document_id: Uuid) -> Result<Analysis, AppError> {
    let document = state
        .store
        .document(document_id)
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    if document.extracted_text.is_empty() {
        return Err(AppError::Validation(
            "Document has no extracted text to analyze".to_string(),
        ));
    }

    let prompt = build_analysis_prompt(
        Some(&document.title),
        document.description.as_deref(),
        &document.extracted_text,
    );

    let started = Instant::now();
    let response = state
        .genai
        .analyze(&prompt, &document.extracted_text)
        .await?;
    state.metrics.observe_ai_latency(started.elapsed());

    let fields = parse_analysis_result(&response.body);
    let analysis = Analysis::new(
        document_id,
        prompt,
        response.raw_text,
        fields,
        state.config.routing.confidence_threshold,
    );

    state.store.insert_analysis(analysis.clone());
    state
        .store
        .update_document_status(document_id, DocumentStatus::Analyzed)?;

    tracing::info!(
        document_id = %document_id,
        analysis_id = %analysis.id,
        feedback_required = analysis.feedback_required,
        "document analyzed"
    );

    Ok(analysis)
}

/// Route a document: evaluate the rules against its analysis and trigger
/// the external workflow engine with the decision payload.
pub async fn route_document(
    state: &AppState,
    document_id: Uuid,
    analysis_id: Option<Uuid>,
) -> Result<RoutedDocument, AppError> {
    let document = state
        .store
        .document(document_id)
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let analysis = resolve_analysis(state, document_id, analysis_id)?;

    let decision = evaluate_routing_rules(
        analysis.fields.amount,
        analysis.fields.risk_level.as_deref(),
        &state.config.routing,
    );

    let payload = build_workflow_payload(&document, &analysis, &decision, state);

    let workflow = match state.workflow.trigger(&payload).await {
        Ok(result) => {
            state.metrics.record_workflow_outcome(true);
            result
        }
        Err(err) => {
            state.metrics.record_workflow_outcome(false);
            return Err(err.into());
        }
    };

    state.store.attach_workflow_result(
        analysis.id,
        workflow.instance_id.clone(),
        workflow.status.clone(),
    )?;
    state
        .store
        .update_document_status(document_id, DocumentStatus::Routed)?;

    tracing::info!(
        document_id = %document_id,
        analysis_id = %analysis.id,
        decision = decision.decision.as_str(),
        instance_id = ?workflow.instance_id,
        "document routed"
    );

    Ok(RoutedDocument {
        document_id,
        analysis_id: analysis.id,
        decision,
        workflow,
    })
}

/// Record a human correction against a document's analysis and clear its
/// feedback-required flag.
pub fn submit_feedback(
    state: &AppState,
    document_id: Uuid,
    analysis_id: Option<Uuid>,
    corrections: &Value,
    comments: Option<String>,
    submitted_by: Option<String>,
) -> Result<Feedback, AppError> {
    // Validated before any lookup so a bad payload is always a 400.
    let corrections = corrections_text(corrections)
        .ok_or_else(|| AppError::Validation("Corrections payload is required".to_string()))?;

    state
        .store
        .document(document_id)
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    let analysis = resolve_analysis(state, document_id, analysis_id)?;

    let feedback = Feedback {
        id: Uuid::new_v4(),
        analysis_id: analysis.id,
        corrections,
        comments: comments.filter(|c| !c.trim().is_empty()),
        submitted_by: submitted_by
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "anonymous".to_string()),
        created_at: Utc::now(),
    };

    state.store.insert_feedback(feedback.clone());
    state.store.clear_feedback_required(analysis.id)?;

    tracing::info!(
        analysis_id = %analysis.id,
        document_id = %document_id,
        "feedback recorded"
    );

    Ok(feedback)
}

/// Pick the analysis an operation targets: an explicit id must belong to
/// the document; otherwise the newest analysis wins.
fn resolve_analysis(
    state: &AppState,
    document_id: Uuid,
    analysis_id: Option<Uuid>,
) -> Result<Analysis, AppError> {
    let analysis = match analysis_id {
        Some(id) => state
            .store
            .analysis(id)
            .filter(|a| a.document_id == document_id),
        None => state.store.latest_analysis(document_id),
    };
    analysis.ok_or_else(|| AppError::NotFound("No analysis found for this document".to_string()))
}

/// Corrections may arrive as a string or as structured JSON. Strings pass
/// through; objects and arrays are serialized; null and empty strings are
/// rejected as absent.
fn corrections_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The body POSTed to the workflow engine: document identity, the analyzed
/// fields, the verdict, and the thresholds it was judged against.
fn build_workflow_payload(
    document: &Document,
    analysis: &Analysis,
    decision: &RoutingDecision,
    state: &AppState,
) -> Value {
    json!({
        "documentId": document.id,
        "analysisId": analysis.id,
        "title": document.title,
        "fileName": document.file_name,
        "fields": {
            "amount": analysis.fields.amount,
            "vendor": analysis.fields.vendor,
            "date": analysis.fields.date,
            "riskLevel": analysis.fields.risk_level,
            "confidence": analysis.fields.confidence,
        },
        "routing": decision,
        "policy": {
            "amountThreshold": state.config.routing.amount_threshold,
            "highRiskLevels": state.config.routing.high_risk_levels,
        },
    })
}
