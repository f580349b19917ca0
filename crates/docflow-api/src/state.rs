//! Shared application state.
//!
//! Everything here is either immutable configuration or an internally
//! synchronized collaborator, so the state clones freely across request
//! handlers with no additional locking.

use std::sync::Arc;

use docflow_client::{GenAiClient, WorkflowClient};
use docflow_core::AppConfig;
use docflow_store::{DocumentStore, InMemoryRagStore, MemoryStore, RagStore};

use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::middleware::metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub rag: Arc<dyn RagStore>,
    pub genai: Arc<GenAiClient>,
    pub workflow: Arc<WorkflowClient>,
    pub extractor: Arc<dyn TextExtractor>,
    pub metrics: ApiMetrics,
}

impl AppState {
    /// Wire the default collaborators: in-memory stores, HTTP clients
    /// built from configuration, and the UTF-8 text extractor.
    pub fn new(config: AppConfig) -> Self {
        let genai = GenAiClient::new(config.genai.clone());
        let workflow = WorkflowClient::new(config.workflow.clone());
        Self {
            config: Arc::new(config),
            store: Arc::new(MemoryStore::new()),
            rag: Arc::new(InMemoryRagStore::new()),
            genai: Arc::new(genai),
            workflow: Arc::new(workflow),
            extractor: Arc::new(PlainTextExtractor),
            metrics: ApiMetrics::new(),
        }
    }

    /// Replace the GenAI client (tests point it at a mock server).
    pub fn with_genai(mut self, genai: GenAiClient) -> Self {
        self.genai = Arc::new(genai);
        self
    }

    /// Replace the workflow client.
    pub fn with_workflow(mut self, workflow: WorkflowClient) -> Self {
        self.workflow = Arc::new(workflow);
        self
    }
}
