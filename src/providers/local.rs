//! Local LLM provider backed by an Ollama server.
//!
//! Used when no hosted provider is configured or all of them failed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::transport::{HttpRequest, Transport};
use super::{ExplanationResult, Provider, ProviderError, ProviderKind};
use crate::config::LocalConfig;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Local Ollama provider
pub struct LocalProvider {
    transport: Arc<dyn Transport>,
    config: LocalConfig,
}

impl LocalProvider {
    pub fn new(transport: Arc<dyn Transport>, config: LocalConfig) -> Self {
        Self { transport, config }
    }

    /// Command that fetches the configured model
    pub fn install_hint(&self) -> String {
        format!(
            "Install Ollama and run: ollama pull {}",
            self.config.model
        )
    }

    fn build_request(&self, prompt: String) -> Result<HttpRequest, ProviderError> {
        let body = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: self.config.num_predict,
            },
        };

        let body = serde_json::to_value(&body).map_err(|e| ProviderError::InvalidRequest {
            provider: self.name().to_string(),
            message: e.to_string(),
        })?;

        Ok(HttpRequest {
            url: self.config.url.clone(),
            query: Vec::new(),
            bearer_token: None,
            body,
            timeout: Some(self.config.timeout()),
        })
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn provider_kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn explain(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ExplanationResult, ProviderError> {
        let request = self.build_request(format!("{}\n{}", system_prompt, user_prompt))?;
        let response = self.transport.post_json(&request).await?;

        if !response.is_success() {
            return Err(ProviderError::ApiError {
                provider: self.name().to_string(),
                status: response.status,
                message: response.body,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&response.body).map_err(|e| ProviderError::InvalidResponse {
                provider: self.name().to_string(),
                message: e.to_string(),
                body: response.body.clone(),
            })?;

        match parsed.response {
            Some(text) if !text.trim().is_empty() => Ok(ExplanationResult {
                raw_response: text,
                provider: ProviderKind::Local,
                model: self.config.model.clone(),
            }),
            _ => Err(ProviderError::EmptyResponse {
                provider: self.name().to_string(),
            }),
        }
    }
}
