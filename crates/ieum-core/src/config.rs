//! Immutable service configuration.
//!
//! All configuration is resolved once at process start and injected into
//! handlers through shared state. Nothing in here is mutated after
//! construction.

use crate::error::{Error, Result};

/// Default embedding model deployment name.
pub const DEFAULT_EMBED_DEPLOYMENT: &str = "text-embedding-3-small";

/// Default API version for the embeddings deployment.
pub const DEFAULT_EMBED_API_VERSION: &str = "2024-02-01";

/// Default API version for chat completions.
pub const DEFAULT_CHAT_API_VERSION: &str = "2024-12-01-preview";

/// Default API version for the search index REST API.
pub const DEFAULT_SEARCH_API_VERSION: &str = "2023-11-01";

/// Default inter-request delay for the webhook fan-out, in milliseconds.
pub const DEFAULT_NOTIFY_DELAY_MS: u64 = 300;

/// Default concurrency cap for the webhook fan-out. The original sender
/// was strictly sequential; 1 preserves that pacing.
pub const DEFAULT_NOTIFY_CONCURRENCY: usize = 1;

/// Fixed recipient list for meeting report notifications.
pub const TEAM_RECIPIENTS: [&str; 6] = [
    "alfzm1024@naver.com",
    "parkjs801801@gmail.com",
    "hyenajeon37@gmail.com",
    "chaehun61@gmail.com",
    "kkst01221203@gmail.com",
    "hntexhibit@gmail.com",
];

/// Webhook fan-out pacing configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Email dispatch webhook URL.
    pub webhook_url: String,
    /// Recipient email addresses.
    pub recipients: Vec<String>,
    /// Delay between consecutive webhook requests, in milliseconds.
    pub delay_ms: u64,
    /// Maximum in-flight webhook requests.
    pub concurrency: usize,
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Search index service endpoint.
    pub search_endpoint: String,
    /// Search index API key.
    pub search_key: String,
    /// Search index name.
    pub search_index: String,
    /// Search REST API version.
    pub search_api_version: String,

    /// Azure OpenAI resource endpoint.
    pub openai_endpoint: String,
    /// Azure OpenAI API key.
    pub openai_key: String,
    /// Chat model deployment name.
    pub chat_deployment: String,
    /// API version for chat completions.
    pub chat_api_version: String,
    /// Embedding model deployment name.
    pub embed_deployment: String,
    /// API version for embeddings.
    pub embed_api_version: String,

    /// Webhook fan-out settings.
    pub notify: NotifyConfig,

    /// HTTP bind host.
    pub host: String,
    /// HTTP bind port.
    pub port: u16,
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
}

impl AppConfig {
    /// Build configuration from environment variables.
    ///
    /// Required: `AZURE_SEARCH_ENDPOINT`, `AZURE_SEARCH_API_KEY`,
    /// `AZURE_SEARCH_INDEX_NAME`, `AZURE_OPENAI_ENDPOINT`,
    /// `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_DEPLOYMENT_NAME`,
    /// `LOGIC_APP_URL`. Everything else has a default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            search_endpoint: required_var("AZURE_SEARCH_ENDPOINT")?,
            search_key: required_var("AZURE_SEARCH_API_KEY")?,
            search_index: required_var("AZURE_SEARCH_INDEX_NAME")?,
            search_api_version: std::env::var("AZURE_SEARCH_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_SEARCH_API_VERSION.to_string()),
            openai_endpoint: required_var("AZURE_OPENAI_ENDPOINT")?,
            openai_key: required_var("AZURE_OPENAI_API_KEY")?,
            chat_deployment: required_var("AZURE_OPENAI_DEPLOYMENT_NAME")?,
            chat_api_version: std::env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_CHAT_API_VERSION.to_string()),
            embed_deployment: std::env::var("AZURE_OPENAI_EMBED_DEPLOYMENT")
                .unwrap_or_else(|_| DEFAULT_EMBED_DEPLOYMENT.to_string()),
            embed_api_version: std::env::var("AZURE_OPENAI_EMBED_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_EMBED_API_VERSION.to_string()),
            notify: NotifyConfig {
                webhook_url: required_var("LOGIC_APP_URL")?,
                recipients: TEAM_RECIPIENTS.iter().map(|s| s.to_string()).collect(),
                delay_ms: std::env::var("NOTIFY_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_NOTIFY_DELAY_MS),
                concurrency: std::env::var("NOTIFY_CONCURRENCY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|&n| n > 0)
                    .unwrap_or(DEFAULT_NOTIFY_CONCURRENCY),
            },
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
        })
    }
}
