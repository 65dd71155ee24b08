//! REST client for the external search index.
//!
//! Speaks the Azure AI Search document API: `api-key` header,
//! `api-version` query parameter, `{"value": [...]}` envelopes.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ieum_core::{AppConfig, Error, Result, StoredMeetingDocument};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the search index client.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Service endpoint, e.g. `https://mysearch.search.windows.net`.
    pub endpoint: String,
    /// Admin or query API key.
    pub api_key: String,
    /// Index name.
    pub index: String,
    /// REST API version.
    pub api_version: String,
}

impl SearchIndexConfig {
    /// Derive the client configuration from the service configuration.
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.search_endpoint.clone(),
            api_key: config.search_key.clone(),
            index: config.search_index.clone(),
            api_version: config.search_api_version.clone(),
        }
    }
}

/// A document returned by a query, decoded defensively: stored documents
/// carry no enforced schema, so every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Serialize)]
struct UploadEntry<'a> {
    #[serde(rename = "@search.action")]
    action: &'a str,
    #[serde(flatten)]
    document: &'a StoredMeetingDocument,
}

#[derive(Serialize)]
struct UploadBatch<'a> {
    value: Vec<UploadEntry<'a>>,
}

#[derive(Deserialize)]
struct IndexingResult {
    key: String,
    status: bool,
    #[serde(rename = "errorMessage", default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct IndexingResponse {
    value: Vec<IndexingResult>,
}

#[derive(Serialize)]
struct VectorQuery<'a> {
    kind: &'a str,
    vector: &'a [f32],
    k: usize,
    fields: &'a str,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    top: Option<usize>,
    select: &'a str,
    #[serde(rename = "vectorQueries", skip_serializing_if = "Option::is_none")]
    vector_queries: Option<Vec<VectorQuery<'a>>>,
}

#[derive(Deserialize)]
struct SearchResponse {
    value: Vec<SearchHit>,
}

/// Client for one search index.
pub struct SearchIndexClient {
    client: Client,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new client for the configured index.
    pub fn new(config: SearchIndexConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Search(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing search index client: endpoint={}, index={}",
            config.endpoint, config.index
        );

        Ok(Self { client, config })
    }

    fn docs_url(&self, operation: &str) -> String {
        format!(
            "{}/indexes/{}/docs/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index,
            operation
        )
    }

    fn build_request(&self, operation: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.docs_url(operation))
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
    }

    /// Upload documents as a single batch.
    ///
    /// The index reports per-document status; any rejected document fails
    /// the batch from the caller's point of view.
    pub async fn upload_documents(&self, documents: &[StoredMeetingDocument]) -> Result<()> {
        let batch = UploadBatch {
            value: documents
                .iter()
                .map(|document| UploadEntry {
                    action: "upload",
                    document,
                })
                .collect(),
        };

        let response = self
            .build_request("index")
            .json(&batch)
            .send()
            .await
            .map_err(|e| Error::Search(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!(
                "Index returned {}: {}",
                status, body
            )));
        }

        let result: IndexingResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse upload response: {}", e)))?;

        for item in &result.value {
            if !item.status {
                return Err(Error::Search(format!(
                    "Document {} rejected: {}",
                    item.key,
                    item.error_message.as_deref().unwrap_or("unknown reason")
                )));
            }
        }

        debug!("Uploaded {} document(s)", result.value.len());
        Ok(())
    }

    /// Fetch up to `top` documents with a `*` full scan.
    ///
    /// The scan guarantees no recency ordering; callers get whatever the
    /// index returns first.
    pub async fn fetch_recent(&self, top: usize) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            search: "*",
            top: Some(top),
            select: "content,source,id",
            vector_queries: None,
        };
        self.run_search(&request).await
    }

    /// Hybrid lexical + vector query over `content`/`source`, returning
    /// the `k` nearest neighbors fused with the text matches.
    pub async fn search_hybrid(
        &self,
        query: &str,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            search: query,
            top: None,
            select: "content,source",
            vector_queries: Some(vec![VectorQuery {
                kind: "vector",
                vector,
                k,
                fields: "content_vector",
            }]),
        };
        self.run_search(&request).await
    }

    async fn run_search(&self, request: &SearchRequest<'_>) -> Result<Vec<SearchHit>> {
        let response = self
            .build_request("search")
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Search(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!(
                "Index returned {}: {}",
                status, body
            )));
        }

        let result: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse search response: {}", e)))?;

        debug!("Search returned {} hit(s)", result.value.len());
        Ok(result.value)
    }
}
