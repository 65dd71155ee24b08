//! Error types for the Ieum meeting service.

use thiserror::Error;

/// Result type alias using ieum's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ieum operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Chat completion / inference failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Search index operation failed
    #[error("Search error: {0}")]
    Search(String),

    /// Webhook notification failed
    #[error("Notify error: {0}")]
    Notify(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether an upstream model error was blocked by the provider's
    /// content moderation. Azure reports this via a `content_filter`
    /// marker in the error message.
    pub fn is_content_filtered(&self) -> bool {
        matches!(self, Error::Inference(msg) if msg.contains("content_filter"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
