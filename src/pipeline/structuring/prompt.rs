/// Target schema for metric extraction. Zero values are illustrative defaults.
pub const METRIC_SCHEMA: &str = r#"{
    "quarterly_revenue_bn": 0.0,
    "eps": 0.0,
    "net_interest_income_millions": 0,
    "dividend_per_share": 0.0,
    "assets_under_supervision_bn": 0.0
}"#;

/// Build the metric-extraction prompt for one report.
///
/// The full extracted text is embedded verbatim; nothing is truncated.
pub fn build_metric_prompt(report_text: &str, label: &str) -> String {
    format!(
        r#"You are a financial analyst. Extract data from this {label} report.

CRITICAL RULES:
1. Ignore "Year Ended" columns. ONLY use "Three Months Ended" (Quarterly).
2. Return ONLY a valid JSON object. No intro text.

REQUIRED JSON STRUCTURE:
{METRIC_SCHEMA}

REPORT TEXT:
{report_text}
"#
    )
}

/// Build the executive-summary prompt over the serialized result set.
pub fn build_summary_prompt(results_json: &str) -> String {
    format!(
        r#"Write a professional executive summary for these quarterly results.
Focus on the Revenue Trend and Asset Growth.

Data: {results_json}
"#
    )
}
