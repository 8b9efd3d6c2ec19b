//! Centralized error types for the architecture graph.

use thiserror::Error;

/// Main error type for graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node '{0}' already exists")]
    DuplicateNode(String),

    #[error("Node '{0}' not found")]
    UnknownNode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid {kind} '{value}'. Must be one of: {expected}")]
    InvalidEnum {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("Persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("Malformed record '{key}': {reason}")]
    MalformedRecord { key: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid-enum error for a value outside a closed set.
    pub fn invalid_enum(kind: &'static str, value: &str, expected: impl Into<String>) -> Self {
        Self::InvalidEnum {
            kind,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Create a persistence error from anything printable.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        Self::PersistenceFailure(err.to_string())
    }

    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
