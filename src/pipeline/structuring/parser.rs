use std::sync::LazyLock;

use regex::Regex;

use super::StructuringError;
use crate::models::MetricRecord;

/// Code-fence markers the model may wrap its JSON in (```` ```json ```` / ```` ``` ````).
static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?").expect("valid regex"));

/// Remove code-fence markers and surrounding whitespace from a model response.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE_RE.replace_all(raw, "").trim().to_string()
}

/// Parse a model response into a metric record, reporting why it failed.
///
/// Only the top-level shape is checked: the payload must be a JSON object.
/// Missing metric fields and unknown extra fields are both accepted.
pub fn parse_metric_record(raw: &str) -> Result<MetricRecord, StructuringError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(StructuringError::MalformedResponse("Empty response".into()));
    }

    let value: serde_json::Value = serde_json::from_str(&cleaned)
        .map_err(|e| StructuringError::JsonParsing(e.to_string()))?;

    if !value.is_object() {
        return Err(StructuringError::MalformedResponse(
            "Top-level JSON value is not an object".into(),
        ));
    }

    serde_json::from_value(value).map_err(|e| StructuringError::JsonParsing(e.to_string()))
}

/// Sanitize a model response into a metric record.
///
/// Model output is unreliable, so a response that does not parse yields
/// `None` instead of an error.
pub fn sanitize_response(raw: &str) -> Option<MetricRecord> {
    match parse_metric_record(raw) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, "Discarding unparseable model response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = r#"{"quarterly_revenue_bn": 12.3, "eps": 1.1, "net_interest_income_millions": 1850, "dividend_per_share": 0.75, "assets_under_supervision_bn": 2810.5}"#;

    fn fenced(json: &str) -> String {
        format!("```json\n{json}\n```")
    }

    #[test]
    fn parses_clean_json() {
        let record = sanitize_response(CLEAN).unwrap();
        assert_eq!(record.quarterly_revenue_bn, Some(12.3));
        assert_eq!(record.eps, Some(1.1));
        assert_eq!(record.net_interest_income_millions, Some(1850.0));
        assert_eq!(record.dividend_per_share, Some(0.75));
        assert_eq!(record.assets_under_supervision_bn, Some(2810.5));
    }

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        for json in [CLEAN, r#"{"eps": 1.5}"#, r#"{}"#, r#"{"eps": 2, "note": "x"}"#] {
            assert_eq!(sanitize_response(json), sanitize_response(&fenced(json)));
            assert!(sanitize_response(json).is_some());
        }
    }

    #[test]
    fn bare_fence_without_language_tag_is_stripped() {
        let raw = format!("```\n{CLEAN}\n```");
        assert!(sanitize_response(&raw).is_some());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let raw = format!("\n\n   {}   \n", fenced(CLEAN));
        assert!(sanitize_response(&raw).is_some());
    }

    #[test]
    fn empty_string_yields_none() {
        assert!(sanitize_response("").is_none());
        assert!(sanitize_response("   \n").is_none());
        assert!(sanitize_response("```json\n```").is_none());
    }

    #[test]
    fn prose_yields_none() {
        assert!(sanitize_response("I could not find the figures in this report.").is_none());
    }

    #[test]
    fn array_yields_none() {
        assert!(sanitize_response(r#"[{"eps": 1.1}]"#).is_none());
        assert!(matches!(
            parse_metric_record("[1, 2]"),
            Err(StructuringError::MalformedResponse(_))
        ));
    }

    #[test]
    fn truncated_json_yields_none() {
        assert!(sanitize_response(r#"{"quarterly_revenue_bn": 12.3, "eps": "#).is_none());
        assert!(matches!(
            parse_metric_record(r#"{"eps": 1."#),
            Err(StructuringError::JsonParsing(_))
        ));
    }

    #[test]
    fn scalar_top_level_yields_none() {
        assert!(sanitize_response("42").is_none());
        assert!(sanitize_response("\"text\"").is_none());
    }

    #[test]
    fn eps_only_record_is_valid() {
        let record = sanitize_response(r#"{"eps": 1.5}"#).unwrap();
        assert_eq!(record.eps_value(), 1.5);
        assert_eq!(record.revenue_bn(), 0.0);
    }

    #[test]
    fn strip_code_fences_removes_all_markers() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }
}
