//! Application state shared across handlers.

use std::sync::Arc;

use ieum_core::{EmbeddingBackend, GenerationBackend};
use ieum_search::SearchIndexClient;

use crate::services::notify::WebhookNotifier;

/// Shared, read-only state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Embedding backend for document vectors.
    pub embeddings: Arc<dyn EmbeddingBackend>,
    /// Chat-completion backend for meeting analysis.
    pub chat: Arc<dyn GenerationBackend>,
    /// Search index client.
    pub search: Arc<SearchIndexClient>,
    /// Email webhook fan-out sender.
    pub notifier: Arc<WebhookNotifier>,
}
