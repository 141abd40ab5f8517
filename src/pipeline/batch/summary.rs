use crate::models::ResultSet;
use crate::pipeline::structuring::prompt::build_summary_prompt;
use crate::pipeline::structuring::types::LlmClient;
use crate::pipeline::structuring::StructuringError;

/// Narrative summary over a complete result set.
pub struct SummaryGenerator<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Returns the model's text verbatim.
    pub fn generate(&self, results: &ResultSet) -> Result<String, StructuringError> {
        let prompt = build_summary_prompt(&results.to_pretty_json());
        tracing::debug!(quarters = results.len(), "Requesting executive summary");
        self.llm.generate(&prompt)
    }
}
