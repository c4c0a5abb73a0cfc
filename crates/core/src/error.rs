//! Unified error types for holocron.
//!
//! Every variant carries owned strings so a single failure can be cloned out
//! to all callers waiting on the same cache key.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the catalog client and server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown route path).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid base or cross-reference URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Non-success response or transport failure.
    #[error("FETCH_FAILED: {0}")]
    Fetch(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Response body is not valid JSON or not the expected shape.
    #[error("PARSE_FAILED: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Fetch(msg) => (-32008, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::Parse(msg) => (-32000, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
