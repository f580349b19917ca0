//! Text extraction boundary.
//!
//! Turning an uploaded file into plain text is an external concern — the
//! pipeline only requires *some* collaborator that produces text from
//! bytes. [`PlainTextExtractor`] is the built-in implementation: it reads
//! the payload as UTF-8 (lossily) and normalizes whitespace. Deployments
//! that ingest real PDFs plug in an extractor backed by a PDF library or
//! extraction service.

use docflow_core::normalize::normalize_text;

/// Produces normalized plain text from an uploaded file's bytes.
pub trait TextExtractor: Send + Sync {
    /// Extract text. Returns a human-readable reason on failure, which the
    /// pipeline maps to a validation error.
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, String>;
}

/// UTF-8 passthrough extractor.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], _mime_type: &str) -> Result<String, String> {
        Ok(normalize_text(&String::from_utf8_lossy(bytes)))
    }
}
