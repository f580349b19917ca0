//! Analysis prompt construction.
//!
//! The preamble names the exact JSON fields the inference service must
//! return: `amount`, `vendor`, `date`, `riskLevel`, `confidence`. Response
//! parsing in docflow-client depends on this field list — the two ends
//! change together or not at all.

/// Build the instruction prompt for one document.
///
/// Sections in order: fixed preamble, optional `Title:` line, optional
/// `Description:` line, then the extracted text block. Absent optional
/// sections are omitted entirely — no blank lines are inserted.
pub fn build_analysis_prompt(
    title: Option<&str>,
    description: Option<&str>,
    extracted_text: &str,
) -> String {
    let title_line = title
        .filter(|t| !t.is_empty())
        .map(|t| format!("Title: {t}"));
    let description_line = description
        .filter(|d| !d.is_empty())
        .map(|d| format!("Description: {d}"));

    let mut lines: Vec<String> = vec![
        "You are an assistant that extracts structured invoice data.".into(),
        "Return ONLY a JSON object with the following fields:".into(),
        r#"{ "amount": number, "vendor": string, "date": "YYYY-MM-DD", "riskLevel": string, "confidence": number }."#.into(),
        "Use null for fields you cannot infer. Keep confidence between 0 and 1.".into(),
        "Do not include any additional commentary.".into(),
        "Context provided from the document follows.".into(),
    ];
    lines.extend(title_line);
    lines.extend(description_line);
    lines.push(format!("ExtractedText:\n{extracted_text}"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_contextual_metadata() {
        let prompt = build_analysis_prompt(
            Some("Invoice 123"),
            Some("Quarterly subscription"),
            "Sample PDF text",
        );
        assert!(prompt.contains("Invoice 123"));
        assert!(prompt.contains("Quarterly subscription"));
        assert!(prompt.contains("ExtractedText"));
        assert!(prompt.contains("Sample PDF text"));
    }

    #[test]
    fn prompt_names_every_contract_field() {
        let prompt = build_analysis_prompt(None, None, "x");
        for field in ["amount", "vendor", "date", "riskLevel", "confidence"] {
            assert!(prompt.contains(field), "missing field {field}");
        }
    }

    #[test]
    fn absent_sections_leave_no_blank_lines() {
        let prompt = build_analysis_prompt(None, None, "text");
        assert!(!prompt.contains("Title:"));
        assert!(!prompt.contains("Description:"));
        assert!(!prompt.contains("\n\n") || prompt.contains("ExtractedText:\ntext"));
        // The only double newline permitted is none at all: every joined
        // line is non-empty, so consecutive newlines cannot appear before
        // the extracted-text block.
        let head = prompt.split("ExtractedText:").next().unwrap();
        assert!(!head.contains("\n\n"));
    }

    #[test]
    fn empty_optional_strings_are_omitted() {
        let prompt = build_analysis_prompt(Some(""), Some(""), "text");
        assert!(!prompt.contains("Title:"));
        assert!(!prompt.contains("Description:"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = build_analysis_prompt(Some("T"), None, "body");
        let b = build_analysis_prompt(Some("T"), None, "body");
        assert_eq!(a, b);
    }
}
