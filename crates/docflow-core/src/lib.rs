//! # docflow-core — Domain Types and Deterministic Pipeline Rules
//!
//! Pure domain layer for the Docflow invoice pipeline. Everything in this
//! crate is deterministic and side-effect free: entity definitions with a
//! forward-only document lifecycle, normalization of loosely-typed AI output,
//! analysis prompt construction, and the routing rule engine that decides
//! whether an invoice can be auto-approved.
//!
//! ## Modules
//!
//! - [`document`]: `Document`, `Analysis`, `Feedback` entities and the
//!   `DocumentStatus` lifecycle (`Uploaded → Processed → Analyzed → Routed`).
//! - [`normalize`]: lossy-but-total coercions from untrusted JSON values
//!   into numbers, ISO dates, and collapsed text.
//! - [`prompt`]: the instruction template sent to the inference service.
//!   The field list in the preamble is a contract shared with
//!   response parsing — change both ends together.
//! - [`routing`]: `evaluate_routing_rules` — the pure decision function.
//! - [`outcome`]: `derive_decision_outcome` — user-facing label ladder.
//! - [`config`]: immutable application configuration built once at startup.

pub mod config;
pub mod document;
pub mod normalize;
pub mod outcome;
pub mod prompt;
pub mod routing;

pub use config::{
    AppConfig, ConfigError, DestinationBinding, GenAiConfig, RoutingPolicy, WorkflowConfig,
};
pub use document::{Analysis, AnalysisFields, Document, DocumentStatus, Feedback};
pub use outcome::{derive_decision_outcome, DecisionOutcome, Tone};
pub use prompt::build_analysis_prompt;
pub use routing::{evaluate_routing_rules, RoutingDecision, RoutingVerdict};
