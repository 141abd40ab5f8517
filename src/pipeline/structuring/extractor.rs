use super::prompt::build_metric_prompt;
use super::types::LlmClient;
use super::StructuringError;

/// Prompt-driven metric extraction for a single report.
///
/// One model call per report. No retry: a failed call is returned to the
/// caller, which decides whether to skip the document.
pub struct MetricExtractor<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> MetricExtractor<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Return the model's raw response for `text`, unmodified.
    pub fn extract_metrics(&self, text: &str, label: &str) -> Result<String, StructuringError> {
        let prompt = build_metric_prompt(text, label);
        tracing::debug!(
            label,
            model = self.llm.model_name(),
            prompt_chars = prompt.len(),
            "Requesting metric extraction"
        );
        self.llm.generate(&prompt)
    }
}
