//! # ieum-search
//!
//! REST client for the external search index (document upload, full
//! scans, hybrid lexical+vector queries) and the RAG context helper
//! built on top of it.

pub mod client;
pub mod context;

pub use client::{SearchHit, SearchIndexClient, SearchIndexConfig};
pub use context::{context_for, NO_RELEVANT_INFO};
