//! # docflow-client — Outbound HTTP Clients
//!
//! Every network call the pipeline makes lives here: the GenAI inference
//! request, and the three-hop chain that triggers the external workflow
//! engine (destination lookup → OAuth token ×2 → trigger POST).
//!
//! ## Error handling
//!
//! Upstream response *shapes* are not trusted: bodies are read as text and
//! speculatively parsed, and malformed JSON degrades to `{"raw": <text>}`
//! instead of failing the call. Upstream *statuses* are: any non-2xx is a
//! hard [`ClientError::Api`] carrying the status and the parsed-or-raw body.
//! Missing configuration fails fast with [`ClientError::NotConfigured`]
//! before any network I/O.
//!
//! ## No retries
//!
//! Nothing in this crate retries. Each hop's failure aborts and surfaces
//! immediately; retry policy belongs to the caller, and re-invoking any
//! operation here is safe at the transport level.

pub mod error;
pub mod extract;
pub mod genai;
pub mod workflow;

mod body;

pub use body::read_speculative_json;
pub use error::ClientError;
pub use extract::parse_analysis_result;
pub use genai::{GenAiClient, GenAiResponse};
pub use workflow::{WorkflowClient, WorkflowTriggerResult};
