use super::StructuringError;

/// Language-model capability: given a prompt, return text.
///
/// Implementations are blocking. The batch pipeline calls them one document
/// at a time, so there is never more than one request in flight.
pub trait LlmClient {
    /// Send a single prompt and return the model's raw text response.
    fn generate(&self, prompt: &str) -> Result<String, StructuringError>;

    /// Model identifier used for logging.
    fn model_name(&self) -> &str;
}

impl<T: LlmClient + ?Sized> LlmClient for &T {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        (**self).generate(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: LlmClient + ?Sized> LlmClient for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        (**self).generate(prompt)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
