//! AI provider abstraction for error analysis.
//!
//! This module provides a unified interface over the hosted chat-completion
//! and generative-content APIs plus the local Ollama fallback. All HTTP goes
//! through the [`Transport`] seam so the fallback chain can be exercised
//! without a network.

pub mod chat;
pub mod generative;
pub mod local;
pub mod remote;
pub mod transport;

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

pub use local::LocalProvider;
pub use remote::RemoteProvider;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};

/// Available AI providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Google Gemini generative-content API
    Gemini,
    /// DeepSeek chat-completions API
    DeepSeek,
    /// OpenAI chat-completions API
    OpenAI,
    /// Local Ollama server
    Local,
}

impl ProviderKind {
    /// Remote providers in the order they are attempted
    pub const PRIORITY: [ProviderKind; 3] = [
        ProviderKind::Gemini,
        ProviderKind::DeepSeek,
        ProviderKind::OpenAI,
    ];

    /// Human readable name used in console status lines
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "Google Gemini",
            ProviderKind::DeepSeek => "DeepSeek",
            ProviderKind::OpenAI => "OpenAI",
            ProviderKind::Local => "Local Ollama",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::DeepSeek => write!(f, "deepseek"),
            ProviderKind::OpenAI => write!(f, "openai"),
            ProviderKind::Local => write!(f, "local"),
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "openai" => Ok(ProviderKind::OpenAI),
            "local" => Ok(ProviderKind::Local),
            _ => Err(format!(
                "Unknown provider: {}. Valid options: gemini, deepseek, openai, local",
                s
            )),
        }
    }
}

/// Which JSON response layout a provider returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `choices[0].message.content`
    Chat,
    /// `candidates[0].content.parts[0].text`
    Generative,
}

/// Decoded provider response, keyed by the shape the descriptor promised
#[derive(Debug)]
pub enum ProviderResponse {
    Chat(chat::ChatCompletionResponse),
    Generative(generative::GenerateContentResponse),
}

impl ProviderResponse {
    /// Decode `body` as the given shape
    pub fn decode(shape: ResponseShape, body: &str) -> Result<Self, serde_json::Error> {
        match shape {
            ResponseShape::Chat => serde_json::from_str(body).map(ProviderResponse::Chat),
            ResponseShape::Generative => {
                serde_json::from_str(body).map(ProviderResponse::Generative)
            }
        }
    }

    /// Text of the first choice or candidate, if any and non-empty
    pub fn into_text(self) -> Option<String> {
        let text = match self {
            ProviderResponse::Chat(response) => response.first_content(),
            ProviderResponse::Generative(response) => response.first_text(),
        }?;
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Static description of a remote provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub model: String,
    pub shape: ResponseShape,
}

/// Gemini API base; the model and method are appended per request
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1/models";
/// DeepSeek chat-completions endpoint
pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
/// OpenAI chat-completions endpoint
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

impl ProviderDescriptor {
    /// Descriptor for a remote provider using `model`.
    ///
    /// Returns `None` for [`ProviderKind::Local`], which is configured
    /// separately.
    pub fn remote(kind: ProviderKind, model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        let (endpoint, shape) = match kind {
            ProviderKind::Gemini => (
                format!("{}/{}:generateContent", GEMINI_API_BASE, model),
                ResponseShape::Generative,
            ),
            ProviderKind::DeepSeek => (DEEPSEEK_API_URL.to_string(), ResponseShape::Chat),
            ProviderKind::OpenAI => (OPENAI_API_URL.to_string(), ResponseShape::Chat),
            ProviderKind::Local => return None,
        };
        Some(Self {
            kind,
            endpoint,
            model,
            shape,
        })
    }
}

/// Result of an explanation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplanationResult {
    /// Raw response text from the provider
    pub raw_response: String,
    /// Provider that generated the response
    pub provider: ProviderKind,
    /// Model used for generation
    pub model: String,
}

/// Provider trait for AI-powered error analysis
///
/// Every provider makes exactly one HTTP call per `explain` and never
/// retries.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind
    fn provider_kind(&self) -> ProviderKind;

    /// Get the provider name for display
    fn name(&self) -> &'static str {
        self.provider_kind().display_name()
    }

    /// Get the current model name/identifier
    fn model_name(&self) -> &str;

    /// Ask the provider to analyze an error.
    ///
    /// # Arguments
    /// * `system_prompt` - Fixed instruction describing the answer format
    /// * `user_prompt` - The error text to analyze
    async fn explain(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ExplanationResult, ProviderError>;
}

/// Error types for provider operations
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API key not configured for {provider}. Set {env_var} environment variable.")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Failed to encode request for {provider}: {message}")]
    InvalidRequest { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error from {provider}: HTTP {status}: {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        provider: String,
        message: String,
        body: String,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },
}

impl ProviderError {
    /// Raw response body, when the failure carried one worth dumping
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ProviderError::InvalidResponse { body, .. } => Some(body.as_str()),
            ProviderError::ApiError { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Get the appropriate environment variable name for a provider's API key
pub fn get_api_key_env_var(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::Gemini => "GEMINI_API_KEY",
        ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
        ProviderKind::OpenAI => "OPENAI_API_KEY",
        ProviderKind::Local => "",
    }
}

/// Credentials keyed by provider. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials(HashMap<ProviderKind, String>);

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a credential; blank keys are ignored
    pub fn with(mut self, provider: ProviderKind, key: impl Into<String>) -> Self {
        self.insert(provider, key);
        self
    }

    pub fn insert(&mut self, provider: ProviderKind, key: impl Into<String>) {
        let key = key.into();
        if provider != ProviderKind::Local && !key.trim().is_empty() {
            self.0.insert(provider, key);
        }
    }

    pub fn get(&self, provider: ProviderKind) -> Option<&str> {
        self.0.get(&provider).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read every remote provider's key from the process environment
    pub fn from_env() -> Self {
        let mut credentials = Self::new();
        for provider in ProviderKind::PRIORITY {
            if let Ok(key) = std::env::var(get_api_key_env_var(provider)) {
                credentials.insert(provider, key);
            }
        }
        credentials
    }
}

/// List all providers with whether they are currently usable
pub fn list_providers(
    credentials: &Credentials,
    local_enabled: bool,
) -> Vec<(ProviderKind, &'static str, bool)> {
    vec![
        (
            ProviderKind::Gemini,
            "Google Gemini API",
            credentials.get(ProviderKind::Gemini).is_some(),
        ),
        (
            ProviderKind::DeepSeek,
            "DeepSeek API",
            credentials.get(ProviderKind::DeepSeek).is_some(),
        ),
        (
            ProviderKind::OpenAI,
            "OpenAI API",
            credentials.get(ProviderKind::OpenAI).is_some(),
        ),
        (ProviderKind::Local, "Local Ollama server", local_enabled),
    ]
}
