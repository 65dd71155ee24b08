//! Backend traits for the Ieum meeting service.
//!
//! These traits define the interfaces that concrete model backends must
//! satisfy, enabling pluggable implementations and testability.

use async_trait::async_trait;

use crate::error::Result;

/// Backend for embedding generation.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Generate an embedding vector for a single query text.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for chat-completion generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a completion for the given system instruction and user
    /// prompt, forcing a structured-JSON response format upstream.
    ///
    /// Returns the raw response string; callers decide how strictly to
    /// parse it.
    async fn generate_json(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
