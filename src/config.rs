use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::structuring::{
    GeminiClient, LlmClient, OllamaClient, StructuringError, DEFAULT_GEMINI_MODEL,
};

/// Application-level constants
pub const APP_NAME: &str = "Earnings Analyzer";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

/// Generous enough for a long 10-Q on a local model.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "earnings_analyzer=warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No API key configured for {0}; set GOOGLE_API_KEY or pass --api-key")]
    MissingApiKey(Provider),

    #[error("Unknown provider '{0}' (expected 'gemini' or 'ollama')")]
    UnknownProvider(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Client(#[from] StructuringError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Gemini)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Model service settings for one analysis run.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub provider: Provider,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Only used by the Ollama provider.
    pub endpoint: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

// The key never reaches logs.
impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AnalyzerConfig {
    /// Defaults for the given provider, with its default model.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            temperature: 0.0,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_for(None)
    }

    /// Like [`from_env`](Self::from_env), but an explicit provider replaces
    /// `ANALYZER_PROVIDER`, which is then never read or validated.
    pub fn from_env_for(provider: Option<Provider>) -> Result<Self, ConfigError> {
        Self::from_lookup(provider, |key| std::env::var(key).ok())
    }

    fn from_lookup(
        provider: Option<Provider>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = match (provider, non_empty("ANALYZER_PROVIDER")) {
            (Some(provider), _) => provider,
            (None, Some(value)) => value.parse()?,
            (None, None) => Provider::default(),
        };

        let mut config = Self::for_provider(provider);
        if let Some(model) = non_empty("ANALYZER_MODEL") {
            config.model = model;
        }
        config.api_key = non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GEMINI_API_KEY"));
        if let Some(endpoint) = non_empty("OLLAMA_ENDPOINT") {
            config.endpoint = endpoint;
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.requires_api_key()
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err(ConfigError::MissingApiKey(self.provider));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model name is empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must be at least 1 second".into()));
        }
        if self.provider == Provider::Ollama
            && !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://"))
        {
            return Err(ConfigError::Invalid(format!(
                "endpoint '{}' must start with http:// or https://",
                self.endpoint
            )));
        }
        Ok(())
    }

    /// Validate, then construct the client for the configured provider.
    pub fn build_client(&self) -> Result<Box<dyn LlmClient>, ConfigError> {
        self.validate()?;
        tracing::info!(provider = %self.provider, model = %self.model, "Model client configured");

        let client: Box<dyn LlmClient> = match self.provider {
            Provider::Gemini => Box::new(GeminiClient::new(
                self.api_key.as_deref().unwrap_or_default(),
                &self.model,
                self.temperature,
                self.timeout_secs,
            )?),
            Provider::Ollama => Box::new(OllamaClient::new(
                &self.endpoint,
                &self.model,
                self.temperature,
                self.timeout_secs,
            )?),
        };
        Ok(client)
    }
}
