//! # API Route Modules
//!
//! Route modules for the Docflow API surface:
//!
//! - `documents` — the document pipeline: upload (multipart or base64 JSON),
//!   AI analysis, routing with workflow trigger, feedback submission, and
//!   read endpoints with derived decision outcomes.
//! - `workflow` — workflow integration status (which external collaborators
//!   are configured).

pub mod documents;
pub mod workflow;
