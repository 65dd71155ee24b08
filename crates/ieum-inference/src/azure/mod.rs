//! Azure OpenAI backend.
//!
//! Azure scopes requests by deployment name rather than by model field,
//! authenticates with an `api-key` header, and versions the API through
//! an `api-version` query parameter.

mod backend;
mod types;

pub use backend::{AzureOpenAIBackend, AzureOpenAIConfig, DEFAULT_TIMEOUT_SECS};
pub use types::*;
