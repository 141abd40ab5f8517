use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::StructuringError;

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a new OllamaClient pointing at an Ollama instance.
    pub fn new(
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, StructuringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
            client,
            timeout_secs,
        })
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl LlmClient for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    StructuringError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    StructuringError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    StructuringError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Scripted reply for [`MockLlmClient`].
#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Fail(String),
}

impl MockReply {
    fn into_result(self) -> Result<String, StructuringError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(body) => Err(StructuringError::Api { status: 429, body }),
        }
    }
}

/// Mock LLM client for testing: replays scripted responses and records prompts.
///
/// Queued replies are consumed in order; once the queue is empty every call
/// gets the fallback reply.
pub struct MockLlmClient {
    queue: RefCell<VecDeque<MockReply>>,
    fallback: MockReply,
    prompts: RefCell<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            fallback: MockReply::Text(response.to_string()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// A client whose every call fails like an exhausted quota (HTTP 429).
    pub fn failing(body: &str) -> Self {
        Self {
            fallback: MockReply::Fail(body.to_string()),
            ..Self::new("")
        }
    }

    /// Queue a successful response ahead of the fallback.
    pub fn then_respond(self, response: &str) -> Self {
        self.queue
            .borrow_mut()
            .push_back(MockReply::Text(response.to_string()));
        self
    }

    /// Queue a failed call ahead of the fallback.
    pub fn then_fail(self, body: &str) -> Self {
        self.queue
            .borrow_mut()
            .push_back(MockReply::Fail(body.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.borrow().len()
    }

    /// Every prompt received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        let reply = self
            .queue
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result()
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
