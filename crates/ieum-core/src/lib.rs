//! # ieum-core
//!
//! Core types, traits, and abstractions for the Ieum meeting service.
//!
//! This crate provides the foundational data structures, the shared error
//! type, and the backend trait definitions that the other ieum crates
//! depend on.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use config::{AppConfig, NotifyConfig, TEAM_RECIPIENTS};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
