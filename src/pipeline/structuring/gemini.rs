//! Google Gemini client for the `generateContent` REST endpoint.
//!
//! Requires an API key from https://aistudio.google.com/.

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::StructuringError;

/// Default Gemini API base URL.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model: fast and cheap, good enough for table lookups.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Blocking Gemini client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        model: &str,
        temperature: f32,
        timeout_secs: u64,
    ) -> Result<Self, StructuringError> {
        if api_key.trim().is_empty() {
            return Err(StructuringError::MissingCredential(
                "Gemini API key is empty".into(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            temperature,
            client,
            timeout_secs,
        })
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Concatenate the text parts of the first candidate.
fn response_text(response: GeminiResponse) -> Result<String, StructuringError> {
    if let Some(error) = response.error {
        return Err(StructuringError::ResponseParsing(error.message));
    }

    let content = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .ok_or_else(|| StructuringError::ResponseParsing("No candidates in response".into()))?;

    Ok(content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join(""))
}

impl LlmClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, StructuringError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
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

        let parsed: GeminiResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        response_text(parsed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
