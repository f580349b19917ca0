//! In-memory store implementation.
//!
//! Vectors in insertion order behind a single `parking_lot::RwLock`; since
//! records carry their own timestamps, insertion order doubles as creation
//! order and "newest first" is a reverse scan.

use std::collections::HashMap;

use docflow_core::{Analysis, Document, DocumentStatus, Feedback};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{DocumentStore, StoreError};

#[derive(Default)]
struct Inner {
    documents: Vec<Document>,
    analyses: Vec<Analysis>,
    feedback: Vec<Feedback>,
}

/// Reference [`DocumentStore`] backed by process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn insert_document(&self, document: Document) {
        self.inner.write().documents.push(document);
    }

    fn document(&self, id: Uuid) -> Option<Document> {
        self.inner
            .read()
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    fn documents(&self) -> Vec<Document> {
        let inner = self.inner.read();
        inner.documents.iter().rev().cloned().collect()
    }

    fn update_document_status(&self, id: Uuid, status: DocumentStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let doc = inner
            .documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound {
                entity: "document",
                id,
            })?;
        if !doc.status.can_advance_to(status) {
            return Err(StoreError::StatusRegression {
                id,
                from: doc.status,
                to: status,
            });
        }
        doc.status = status;
        Ok(())
    }

    fn insert_analysis(&self, analysis: Analysis) {
        self.inner.write().analyses.push(analysis);
    }

    fn analysis(&self, id: Uuid) -> Option<Analysis> {
        self.inner
            .read()
            .analyses
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    fn analyses_for_document(&self, document_id: Uuid) -> Vec<Analysis> {
        self.inner
            .read()
            .analyses
            .iter()
            .rev()
            .filter(|a| a.document_id == document_id)
            .cloned()
            .collect()
    }

    fn latest_analyses(&self, document_ids: &[Uuid]) -> HashMap<Uuid, Analysis> {
        let inner = self.inner.read();
        let mut latest = HashMap::new();
        // Forward scan: later inserts overwrite earlier ones.
        for analysis in &inner.analyses {
            if document_ids.contains(&analysis.document_id) {
                latest.insert(analysis.document_id, analysis.clone());
            }
        }
        latest
    }

    fn attach_workflow_result(
        &self,
        analysis_id: Uuid,
        instance_id: Option<String>,
        status: String,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let analysis = inner
            .analyses
            .iter_mut()
            .find(|a| a.id == analysis_id)
            .ok_or(StoreError::NotFound {
                entity: "analysis",
                id: analysis_id,
            })?;
        analysis.workflow_instance_id = instance_id;
        analysis.workflow_status = Some(status);
        Ok(())
    }

    fn clear_feedback_required(&self, analysis_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let analysis = inner
            .analyses
            .iter_mut()
            .find(|a| a.id == analysis_id)
            .ok_or(StoreError::NotFound {
                entity: "analysis",
                id: analysis_id,
            })?;
        analysis.feedback_required = false;
        analysis.feedback_provided = true;
        Ok(())
    }

    fn insert_feedback(&self, feedback: Feedback) {
        self.inner.write().feedback.push(feedback);
    }

    fn feedback_for_analysis(&self, analysis_id: Uuid) -> Vec<Feedback> {
        self.inner
            .read()
            .feedback
            .iter()
            .rev()
            .filter(|f| f.analysis_id == analysis_id)
            .cloned()
            .collect()
    }
}
