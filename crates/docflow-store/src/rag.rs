//! Retrieval-augmented search collaborator interface.
//!
//! No real similarity algorithm exists behind this boundary yet. The
//! in-memory implementation scores by case-insensitive substring
//! containment (0 or 1) — a placeholder, not the intended long-term
//! ranking. Callers should treat scores as opaque.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One stored text chunk with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagChunk {
    pub id: String,
    pub document_id: Uuid,
    pub text: String,
    pub metadata: Value,
    /// Populated on search results; 0 outside of search.
    pub score: f64,
}

/// Capability interface for the similarity store.
pub trait RagStore: Send + Sync {
    /// Replace a document's chunks with a new set. Chunk ids are
    /// `<document id>-<index>`.
    fn upsert_embeddings(&self, document_id: Uuid, chunks: Vec<(String, Value)>) -> Vec<RagChunk>;

    /// Best-scoring chunks for a query, highest first, truncated to `limit`.
    fn similarity_search(&self, query: &str, limit: usize) -> Vec<RagChunk>;

    /// All chunks stored for a document, insertion order.
    fn get_history(&self, document_id: Uuid) -> Vec<RagChunk>;
}

/// In-memory [`RagStore`] with substring-containment scoring.
#[derive(Default)]
pub struct InMemoryRagStore {
    items: RwLock<Vec<RagChunk>>,
}

impl InMemoryRagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RagStore for InMemoryRagStore {
    fn upsert_embeddings(&self, document_id: Uuid, chunks: Vec<(String, Value)>) -> Vec<RagChunk> {
        let normalized: Vec<RagChunk> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, (text, metadata))| RagChunk {
                id: format!("{document_id}-{index}"),
                document_id,
                text,
                metadata,
                score: 0.0,
            })
            .collect();

        let mut items = self.items.write();
        items.retain(|entry| entry.document_id != document_id);
        items.extend(normalized.iter().cloned());
        normalized
    }

    fn similarity_search(&self, query: &str, limit: usize) -> Vec<RagChunk> {
        let lowered = query.to_lowercase();
        if lowered.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<RagChunk> = self
            .items
            .read()
            .iter()
            .filter(|item| item.text.to_lowercase().contains(&lowered))
            .map(|item| RagChunk {
                score: 1.0,
                ..item.clone()
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    fn get_history(&self, document_id: Uuid) -> Vec<RagChunk> {
        self.items
            .read()
            .iter()
            .filter(|entry| entry.document_id == document_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_retrieves_document_history() {
        let store = InMemoryRagStore::new();
        let doc = Uuid::new_v4();
        store.upsert_embeddings(
            doc,
            vec![
                ("First version of the document".into(), json!({"version": 1})),
                ("Second version mentioning budget".into(), json!({"version": 2})),
            ],
        );

        let history = store.get_history(doc);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, format!("{doc}-0"));

        let results = store.similarity_search("budget", 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["version"], 2);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn upsert_replaces_previous_chunks() {
        let store = InMemoryRagStore::new();
        let doc = Uuid::new_v4();
        store.upsert_embeddings(doc, vec![("old text".into(), Value::Null)]);
        store.upsert_embeddings(doc, vec![("new text".into(), Value::Null)]);

        let history = store.get_history(doc);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "new text");
        assert!(store.similarity_search("old", 5).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_and_bounded() {
        let store = InMemoryRagStore::new();
        let doc = Uuid::new_v4();
        store.upsert_embeddings(
            doc,
            vec![
                ("Invoice from ACME".into(), Value::Null),
                ("another acme invoice".into(), Value::Null),
            ],
        );

        let results = store.similarity_search("Acme", 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let store = InMemoryRagStore::new();
        store.upsert_embeddings(Uuid::new_v4(), vec![("text".into(), Value::Null)]);
        assert!(store.similarity_search("", 5).is_empty());
    }
}
