//! Document, analysis, and feedback entities.
//!
//! The store owns persistence of these records; the pipeline only reads
//! fields and requests status transitions. `DocumentStatus` is ordered and
//! only moves forward under normal operation — the store enforces this.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle status of an uploaded document.
///
/// Transitions are strictly forward: `Uploaded → Processed → Analyzed →
/// Routed`. A document never regresses; re-analysis of an already-routed
/// document leaves its status untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Uploaded,
    Processed,
    Analyzed,
    Routed,
}

impl DocumentStatus {
    /// Position in the lifecycle, used for the forward-only check.
    pub fn rank(self) -> u8 {
        match self {
            Self::Uploaded => 0,
            Self::Processed => 1,
            Self::Analyzed => 2,
            Self::Routed => 3,
        }
    }

    /// Whether moving from `self` to `next` is a forward (or no-op) move.
    pub fn can_advance_to(self, next: DocumentStatus) -> bool {
        next.rank() >= self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "UPLOADED",
            Self::Processed => "PROCESSED",
            Self::Analyzed => "ANALYZED",
            Self::Routed => "ROUTED",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ingested document with its extracted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub file_size: u64,
    pub extracted_text: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
}

/// The five normalized fields extracted from an AI response.
///
/// Every field is optional — the inference service is instructed to return
/// null for anything it cannot infer, and malformed responses degrade to
/// all-None rather than failing the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFields {
    pub amount: Option<f64>,
    pub vendor: Option<String>,
    pub date: Option<NaiveDate>,
    pub risk_level: Option<String>,
    pub confidence: Option<f64>,
}

/// One analysis run over a document.
///
/// A document may accumulate multiple analyses (re-analysis is permitted and
/// always creates a fresh record); "latest" is creation order. Mutated only
/// to attach feedback flags or workflow results, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: Uuid,
    pub document_id: Uuid,
    /// The exact prompt sent to the inference service.
    pub prompt: String,
    /// The raw response text, preserved verbatim for diagnostics.
    pub response: String,
    pub fields: AnalysisFields,
    /// Set when confidence is missing or below the configured cutoff.
    pub feedback_required: bool,
    pub feedback_provided: bool,
    pub workflow_instance_id: Option<String>,
    pub workflow_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Analysis {
    /// Create a fresh analysis record from a parsed inference response.
    pub fn new(
        document_id: Uuid,
        prompt: String,
        response: String,
        fields: AnalysisFields,
        confidence_threshold: f64,
    ) -> Self {
        let feedback_required = match fields.confidence {
            Some(c) => c < confidence_threshold,
            None => true,
        };
        Self {
            id: Uuid::new_v4(),
            document_id,
            prompt,
            response,
            fields,
            feedback_required,
            feedback_provided: false,
            workflow_instance_id: None,
            workflow_status: None,
            created_at: Utc::now(),
        }
    }
}

/// A human correction event against an analysis. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub analysis_id: Uuid,
    /// Free-form corrections payload; structured payloads are serialized.
    pub corrections: String,
    pub comments: Option<String>,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_moves_forward() {
        assert!(DocumentStatus::Uploaded.can_advance_to(DocumentStatus::Processed));
        assert!(DocumentStatus::Processed.can_advance_to(DocumentStatus::Analyzed));
        assert!(DocumentStatus::Analyzed.can_advance_to(DocumentStatus::Routed));
        assert!(!DocumentStatus::Routed.can_advance_to(DocumentStatus::Uploaded));
        assert!(!DocumentStatus::Analyzed.can_advance_to(DocumentStatus::Processed));
    }

    #[test]
    fn status_self_transition_is_allowed() {
        assert!(DocumentStatus::Analyzed.can_advance_to(DocumentStatus::Analyzed));
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&DocumentStatus::Processed).unwrap();
        assert_eq!(json, "\"PROCESSED\"");
    }

    #[test]
    fn missing_confidence_requires_feedback() {
        let a = Analysis::new(
            Uuid::new_v4(),
            "p".into(),
            "r".into(),
            AnalysisFields::default(),
            0.8,
        );
        assert!(a.feedback_required);
        assert!(!a.feedback_provided);
    }

    #[test]
    fn low_confidence_requires_feedback() {
        let fields = AnalysisFields {
            confidence: Some(0.5),
            ..Default::default()
        };
        let a = Analysis::new(Uuid::new_v4(), "p".into(), "r".into(), fields, 0.8);
        assert!(a.feedback_required);
    }

    #[test]
    fn high_confidence_skips_feedback() {
        let fields = AnalysisFields {
            confidence: Some(0.91),
            ..Default::default()
        };
        let a = Analysis::new(Uuid::new_v4(), "p".into(), "r".into(), fields, 0.8);
        assert!(!a.feedback_required);
    }
}
