//! Structured logging field name constants.
//!
//! All crates use these constants for consistent structured logging
//! fields, so log aggregation tools can query by standardized names
//! across every subsystem.

/// Subsystem originating the log event.
/// Values: "api", "search", "inference", "notify"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "analyze", "embed_query", "upload", "fan_out"
pub const OPERATION: &str = "op";

/// Stored document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Number of results returned by a search or query.
pub const RESULT_COUNT: &str = "result_count";

/// Number of webhook requests issued by a fan-out.
pub const SENT_COUNT: &str = "sent_count";

/// Byte length of a prompt or response.
pub const RESPONSE_LEN: &str = "response_len";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
