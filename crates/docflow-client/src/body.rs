//! Speculative response-body parsing shared by every client.

use serde_json::{json, Value};

/// Parse response text as JSON on a best-effort basis.
///
/// Empty bodies become `{}`; invalid JSON is preserved under a `raw` key
/// rather than raised as an error — upstream response shapes are not
/// trusted, and a parse failure must never fail the request.
pub fn read_speculative_json(text: &str) -> Value {
    if text.is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}
