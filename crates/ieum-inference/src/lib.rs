//! # ieum-inference
//!
//! Azure-OpenAI-compatible inference backends for the Ieum meeting
//! service: query embeddings and JSON-mode chat completions.

pub mod azure;

pub use azure::{AzureOpenAIBackend, AzureOpenAIConfig};
