//! Internal services used by the HTTP handlers.

pub mod notify;
pub mod store;
