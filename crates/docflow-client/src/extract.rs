//! AI-response field extraction.
//!
//! Inference backends wrap their output in wildly different envelopes.
//! Rather than ad hoc branching, the candidate locations are an ordered
//! probe list — a documented, tested contract. The first probe yielding a
//! truthy value wins; probe order is load-bearing and changing it is a
//! breaking change for every caller.

use docflow_core::normalize::{normalize_date, normalize_number};
use docflow_core::AnalysisFields;
use serde_json::Value;

/// One candidate location for the model output inside a response body.
struct Probe {
    name: &'static str,
    extract: fn(&Value) -> Option<&Value>,
}

/// Candidate locations, tried in order. The final fallback (the whole
/// body) is handled by [`response_candidate`] itself.
const PROBES: &[Probe] = &[
    Probe {
        name: "result",
        extract: |body| body.get("result"),
    },
    Probe {
        name: "output",
        extract: |body| body.get("output"),
    },
    Probe {
        name: "choices[0].message.content",
        extract: |body| {
            body.get("choices")?
                .get(0)?
                .get("message")?
                .get("content")
        },
    },
    Probe {
        name: "generated_text",
        extract: |body| body.get("generated_text"),
    },
    Probe {
        name: "completion",
        extract: |body| body.get("completion"),
    },
    Probe {
        name: "content",
        extract: |body| body.get("content"),
    },
];

/// JavaScript-style truthiness, which is what loosely-typed upstreams
/// effectively encode: null, false, 0, and "" are falsy; objects and
/// arrays (even empty) are truthy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Locate the model output inside a response body.
///
/// Returns the first truthy probe hit, falling back to the whole body.
pub fn response_candidate(body: &Value) -> &Value {
    for probe in PROBES {
        if let Some(value) = (probe.extract)(body) {
            if is_truthy(value) {
                tracing::trace!(probe = probe.name, "response candidate matched");
                return value;
            }
        }
    }
    body
}

/// First non-empty string under any of the given keys.
fn string_field<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
}

/// First truthy value under any of the given keys.
fn first_field<'a>(obj: &'a Value, keys: &[&str]) -> &'a Value {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| is_truthy(v))
        .unwrap_or(&Value::Null)
}

/// Normalize a parsed inference response body into analysis fields.
///
/// The candidate is located via the probe list; string candidates are
/// parsed as JSON (failure degrades to an empty object, not an error).
/// Field aliases are accepted: `vendor`|`supplier`, `date`|`invoiceDate`,
/// `riskLevel`|`risk`.
pub fn parse_analysis_result(body: &Value) -> AnalysisFields {
    let candidate = response_candidate(body);

    let structured: Value = match candidate {
        Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| Value::Object(Default::default())),
        Value::Object(_) => candidate.clone(),
        _ => Value::Object(Default::default()),
    };

    let field = |key: &str| structured.get(key).unwrap_or(&Value::Null);

    AnalysisFields {
        amount: normalize_number(field("amount")),
        vendor: string_field(&structured, &["vendor", "supplier"]).map(str::to_string),
        date: normalize_date(first_field(&structured, &["date", "invoiceDate"])),
        risk_level: string_field(&structured, &["riskLevel", "risk"]).map(str::to_string),
        confidence: normalize_number(field("confidence")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn probe_order_is_the_documented_contract() {
        // `result` wins over `output`, which wins over the chat shape, etc.
        let body = json!({
            "result": {"amount": 1},
            "output": {"amount": 2},
            "choices": [{"message": {"content": "{\"amount\": 3}"}}],
        });
        assert_eq!(response_candidate(&body), &json!({"amount": 1}));

        let body = json!({
            "output": {"amount": 2},
            "generated_text": "{\"amount\": 4}",
        });
        assert_eq!(response_candidate(&body), &json!({"amount": 2}));

        let body = json!({
            "generated_text": "gen",
            "completion": "comp",
            "content": "cont",
        });
        assert_eq!(response_candidate(&body), &json!("gen"));
    }

    #[test]
    fn falsy_candidates_are_skipped() {
        let body = json!({"result": null, "output": "", "completion": "x"});
        assert_eq!(response_candidate(&body), &json!("x"));
    }

    #[test]
    fn whole_body_is_the_fallback() {
        let body = json!({"amount": 9, "vendor": "V"});
        assert_eq!(response_candidate(&body), &body);
    }

    #[test]
    fn chat_completion_shape_is_probed() {
        let body = json!({
            "choices": [{"message": {"content": "{\"amount\": \"42\", \"vendor\": \"X\"}"}}]
        });
        let fields = parse_analysis_result(&body);
        assert_eq!(fields.amount, Some(42.0));
        assert_eq!(fields.vendor.as_deref(), Some("X"));
    }

    #[test]
    fn numeric_strings_and_iso_dates_normalize() {
        let body = json!({
            "result": {
                "amount": "1200.50",
                "vendor": "Acme Corp",
                "date": "2024-03-01",
                "riskLevel": "High",
                "confidence": "0.91",
            }
        });
        let fields = parse_analysis_result(&body);
        assert_eq!(fields.amount, Some(1200.5));
        assert_eq!(fields.vendor.as_deref(), Some("Acme Corp"));
        assert_eq!(fields.date.unwrap().to_string(), "2024-03-01");
        assert_eq!(fields.risk_level.as_deref(), Some("High"));
        assert_eq!(fields.confidence, Some(0.91));
    }

    #[test]
    fn alias_fields_are_accepted() {
        let body = json!({
            "result": {
                "supplier": "Alias Inc",
                "invoiceDate": "2024-05-06",
                "risk": "low",
            }
        });
        let fields = parse_analysis_result(&body);
        assert_eq!(fields.vendor.as_deref(), Some("Alias Inc"));
        assert_eq!(fields.date.unwrap().to_string(), "2024-05-06");
        assert_eq!(fields.risk_level.as_deref(), Some("low"));
    }

    #[test]
    fn canonical_names_win_over_aliases() {
        let body = json!({
            "result": {"vendor": "Canonical", "supplier": "Alias"}
        });
        assert_eq!(
            parse_analysis_result(&body).vendor.as_deref(),
            Some("Canonical")
        );
    }

    #[test]
    fn zero_amount_is_preserved() {
        let body = json!({"result": {"amount": 0, "confidence": 0}});
        let fields = parse_analysis_result(&body);
        assert_eq!(fields.amount, Some(0.0));
        assert_eq!(fields.confidence, Some(0.0));
    }

    #[test]
    fn unparseable_string_candidate_degrades_to_empty() {
        let body = json!({"result": "not json at all"});
        assert_eq!(parse_analysis_result(&body), AnalysisFields::default());
    }

    #[test]
    fn non_object_candidate_degrades_to_empty() {
        let body = json!({"result": 42});
        assert_eq!(parse_analysis_result(&body), AnalysisFields::default());
    }
}
