//! Azure OpenAI backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use ieum_core::{AppConfig, EmbeddingBackend, Error, GenerationBackend, Result};

use super::types::*;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the Azure OpenAI backend.
#[derive(Debug, Clone)]
pub struct AzureOpenAIConfig {
    /// Azure OpenAI resource endpoint, e.g. `https://myres.openai.azure.com`.
    pub endpoint: String,
    /// API key for the resource.
    pub api_key: String,
    /// Deployment name used for embeddings.
    pub embed_deployment: String,
    /// API version for the embeddings deployment.
    pub embed_api_version: String,
    /// Deployment name used for chat completions.
    pub chat_deployment: String,
    /// API version for chat completions.
    pub chat_api_version: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl AzureOpenAIConfig {
    /// Derive the backend configuration from the service configuration.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.openai_endpoint.clone(),
            api_key: config.openai_key.clone(),
            embed_deployment: config.embed_deployment.clone(),
            embed_api_version: config.embed_api_version.clone(),
            chat_deployment: config.chat_deployment.clone(),
            chat_api_version: config.chat_api_version.clone(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Azure OpenAI inference backend.
pub struct AzureOpenAIBackend {
    client: Client,
    config: AzureOpenAIConfig,
}

impl AzureOpenAIBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: AzureOpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Azure OpenAI backend: endpoint={}, embed={}, chat={}",
            config.endpoint, config.embed_deployment, config.chat_deployment
        );

        Ok(Self { client, config })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &AzureOpenAIConfig {
        &self.config
    }

    /// Build a deployment-scoped request with authentication.
    fn build_request(
        &self,
        deployment: &str,
        operation: &str,
        api_version: &str,
    ) -> reqwest::RequestBuilder {
        let url = format!(
            "{}/openai/deployments/{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            deployment,
            operation
        );

        self.client
            .post(&url)
            .query(&[("api-version", api_version)])
            .header("api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
    }

    /// Read an error response body into a message that keeps the Azure
    /// error code (`content_filter` in particular) visible to callers.
    async fn upstream_error(status: reqwest::StatusCode, response: reqwest::Response) -> String {
        let body: AzureErrorResponse =
            response.json().await.unwrap_or(AzureErrorResponse {
                error: AzureError {
                    message: "Unknown error".to_string(),
                    code: None,
                },
            });
        match body.error.code {
            Some(code) => format!("Azure OpenAI returned {} ({}): {}", status, code, body.error.message),
            None => format!("Azure OpenAI returned {}: {}", status, body.error.message),
        }
    }
}

#[async_trait]
impl EmbeddingBackend for AzureOpenAIBackend {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            "Embedding query with deployment {}, text length: {}",
            self.config.embed_deployment,
            text.len()
        );

        let request = EmbeddingRequest {
            input: vec![text.to_string()],
        };

        let response = self
            .build_request(
                &self.config.embed_deployment,
                "embeddings",
                &self.config.embed_api_version,
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Embedding(
                Self::upstream_error(status, response).await,
            ));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("Failed to parse response: {}", e)))?;

        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Embedding("Empty embedding response".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.embed_deployment
    }
}

#[async_trait]
impl GenerationBackend for AzureOpenAIBackend {
    async fn generate_json(&self, system: &str, prompt: &str) -> Result<String> {
        debug!(
            "Generating with deployment {}, prompt length: {}",
            self.config.chat_deployment,
            prompt.len()
        );

        let mut messages = Vec::new();

        if !system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        let request = ChatCompletionRequest {
            messages,
            response_format: Some(ResponseFormat::json_object()),
        };

        let response = self
            .build_request(
                &self.config.chat_deployment,
                "chat/completions",
                &self.config.chat_api_version,
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Inference(
                Self::upstream_error(status, response).await,
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!("Generation complete, response length: {}", content.len());
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.chat_deployment
    }
}
