use async_trait::async_trait;
use std::time::Duration;
use crate::config::LLMConfig;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};
use super::openai::OpenAIAdapter;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// A `provider/model` pair parsed from a model identifier such as `azure/gpt-4o`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: String,
    pub model: String,
}

impl ModelId {
    /// Identifiers without a provider prefix are treated as OpenAI models.
    pub fn parse(id: &str) -> AppResult<Self> {
        let (provider, model) = match id.split_once('/') {
            Some((provider, model)) => (provider.trim().to_lowercase(), model.trim()),
            None => ("openai".to_string(), id.trim()),
        };
        if model.is_empty() {
            return Err(AppError::Configuration(format!("invalid model identifier: {:?}", id)));
        }
        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
    model: String,
}

impl LLM {
    /// Build the adapter for `config.default_model`.
    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let id = ModelId::parse(&config.default_model)?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let adapter: Box<dyn LLMAdapter> = match id.provider.as_str() {
            "azure" => {
                let endpoint = config.azure_openai_endpoint.as_deref().ok_or_else(|| {
                    AppError::Configuration("AZURE_OPENAI_ENDPOINT is not set".to_string())
                })?;
                let api_key = config.azure_openai_api_key.as_deref().ok_or_else(|| {
                    AppError::Configuration("AZURE_OPENAI_API_KEY is not set".to_string())
                })?;
                Box::new(OpenAIAdapter::azure(
                    endpoint,
                    &id.model,
                    &config.azure_openai_api_version,
                    api_key,
                    timeout,
                )?)
            }
            "openai" => {
                let api_key = config.openai_api_key.as_deref().ok_or_else(|| {
                    AppError::Configuration("OPENAI_API_KEY is not set".to_string())
                })?;
                Box::new(OpenAIAdapter::new_with_api_base(
                    api_key,
                    &config.openai_base_url,
                    timeout,
                )?)
            }
            other => {
                return Err(AppError::Configuration(format!(
                    "Unsupported LLM provider: {}",
                    other
                )))
            }
        };

        Ok(Self {
            adapter,
            provider_name: id.provider,
            model: id.model,
        })
    }

    /// Wrap an existing adapter
    pub fn with_adapter(adapter: Box<dyn LLMAdapter>, provider_name: &str, model: &str) -> Self {
        Self {
            adapter,
            provider_name: provider_name.to_string(),
            model: model.to_string(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}
