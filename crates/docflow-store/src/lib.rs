//! # docflow-store — Entity Store Capability Interface
//!
//! Persistence is an external collaborator of the pipeline, specified only
//! at its interface boundary: insert, update-by-id, select-one-by-filter,
//! select-many newest-first, and select-many-in-set over `Document`,
//! `Analysis`, and `Feedback` records.
//!
//! [`DocumentStore`] is the capability trait; [`MemoryStore`] is the
//! in-memory reference implementation backing tests and single-process
//! deployments. The store is the one place that enforces the forward-only
//! document lifecycle — a regression request is a [`StoreError`], not a
//! silent overwrite.
//!
//! The [`rag`] module carries the retrieval-augmented search collaborator
//! interface with its substring-containment stub.

pub mod memory;
pub mod rag;

use std::collections::HashMap;

use docflow_core::{Analysis, Document, DocumentStatus, Feedback};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use rag::{InMemoryRagStore, RagChunk, RagStore};

/// Store operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No record with the given id.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// A document status update would move the lifecycle backwards.
    #[error("document {id} cannot move from {from} to {to}")]
    StatusRegression {
        id: Uuid,
        from: DocumentStatus,
        to: DocumentStatus,
    },
}

/// Capability interface over the entity store.
///
/// Object-safe and `Send + Sync` so one store can sit behind an `Arc` and
/// serve concurrent requests; implementations own their interior locking.
pub trait DocumentStore: Send + Sync {
    fn insert_document(&self, document: Document);

    fn document(&self, id: Uuid) -> Option<Document>;

    /// All documents, newest first.
    fn documents(&self) -> Vec<Document>;

    /// Advance a document's lifecycle status. Forward-only: a regression
    /// attempt fails with [`StoreError::StatusRegression`].
    fn update_document_status(&self, id: Uuid, status: DocumentStatus) -> Result<(), StoreError>;

    fn insert_analysis(&self, analysis: Analysis);

    fn analysis(&self, id: Uuid) -> Option<Analysis>;

    /// Analyses for one document, newest first.
    fn analyses_for_document(&self, document_id: Uuid) -> Vec<Analysis>;

    /// The most recently created analysis for a document.
    fn latest_analysis(&self, document_id: Uuid) -> Option<Analysis> {
        self.analyses_for_document(document_id).into_iter().next()
    }

    /// Latest analysis per document for a set of documents.
    fn latest_analyses(&self, document_ids: &[Uuid]) -> HashMap<Uuid, Analysis> {
        document_ids
            .iter()
            .filter_map(|id| self.latest_analysis(*id).map(|a| (*id, a)))
            .collect()
    }

    /// Record the workflow instance the trigger call produced.
    fn attach_workflow_result(
        &self,
        analysis_id: Uuid,
        instance_id: Option<String>,
        status: String,
    ) -> Result<(), StoreError>;

    /// Clear the feedback-required flag and mark feedback as provided.
    /// The only mutation path for the flag besides its initial computation.
    fn clear_feedback_required(&self, analysis_id: Uuid) -> Result<(), StoreError>;

    fn insert_feedback(&self, feedback: Feedback);

    /// Feedback records for one analysis, newest first.
    fn feedback_for_analysis(&self, analysis_id: Uuid) -> Vec<Feedback>;
}
