//! Hosted LLM providers (Gemini, DeepSeek, OpenAI).
//!
//! One type covers all three: the descriptor decides the request layout,
//! where the credential goes, and which response shape to decode.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use super::chat::ChatCompletionRequest;
use super::generative::GenerateContentRequest;
use super::transport::{HttpRequest, Transport};
use super::{
    get_api_key_env_var, Credentials, ExplanationResult, Provider, ProviderDescriptor,
    ProviderError, ProviderKind, ProviderResponse, ResponseShape,
};

/// A hosted provider with its credential
pub struct RemoteProvider {
    transport: Arc<dyn Transport>,
    descriptor: ProviderDescriptor,
    api_key: String,
}

impl RemoteProvider {
    pub fn new(
        transport: Arc<dyn Transport>,
        descriptor: ProviderDescriptor,
        api_key: String,
    ) -> Self {
        Self {
            transport,
            descriptor,
            api_key,
        }
    }

    /// Create from configured credentials
    pub fn from_credentials(
        transport: Arc<dyn Transport>,
        descriptor: ProviderDescriptor,
        credentials: &Credentials,
    ) -> Result<Self, ProviderError> {
        let kind = descriptor.kind;
        let api_key = credentials
            .get(kind)
            .ok_or_else(|| ProviderError::MissingApiKey {
                provider: kind.display_name().to_string(),
                env_var: get_api_key_env_var(kind).to_string(),
            })?
            .to_string();

        Ok(Self::new(transport, descriptor, api_key))
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    /// Build the request for this provider's shape
    pub fn build_request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<HttpRequest, ProviderError> {
        let request = match self.descriptor.shape {
            ResponseShape::Chat => HttpRequest {
                url: self.descriptor.endpoint.clone(),
                query: Vec::new(),
                bearer_token: Some(self.api_key.clone()),
                body: self.encode(&ChatCompletionRequest::new(
                    &self.descriptor.model,
                    system_prompt,
                    user_prompt,
                ))?,
                timeout: None,
            },
            ResponseShape::Generative => HttpRequest {
                url: self.descriptor.endpoint.clone(),
                query: vec![("key".to_string(), self.api_key.clone())],
                bearer_token: None,
                body: self.encode(&GenerateContentRequest::new(system_prompt, user_prompt))?,
                timeout: None,
            },
        };
        Ok(request)
    }

    fn encode<T: Serialize>(&self, body: &T) -> Result<serde_json::Value, ProviderError> {
        serde_json::to_value(body).map_err(|e| ProviderError::InvalidRequest {
            provider: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Provider for RemoteProvider {
    fn provider_kind(&self) -> ProviderKind {
        self.descriptor.kind
    }

    fn model_name(&self) -> &str {
        &self.descriptor.model
    }

    async fn explain(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<ExplanationResult, ProviderError> {
        let request = self.build_request(system_prompt, user_prompt)?;
        let response = self.transport.post_json(&request).await?;

        if !response.is_success() {
            return Err(ProviderError::ApiError {
                provider: self.name().to_string(),
                status: response.status,
                message: response.body,
            });
        }

        let decoded = ProviderResponse::decode(self.descriptor.shape, &response.body).map_err(
            |e| ProviderError::InvalidResponse {
                provider: self.name().to_string(),
                message: e.to_string(),
                body: response.body.clone(),
            },
        )?;

        let text = decoded
            .into_text()
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: self.name().to_string(),
            })?;

        Ok(ExplanationResult {
            raw_response: text,
            provider: self.descriptor.kind,
            model: self.descriptor.model.clone(),
        })
    }
}
