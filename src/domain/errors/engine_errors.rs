use std::time::Duration;

use serde::Serialize;

use crate::domain::errors::ValidationError;

/// Coarse classification of every failure the engine can report.
///
/// Outcomes carry the kind rather than the full error so a caller can group
/// and count them ("permission denied on 3 of 40 files").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    MalformedLink,
    ProviderError,
    Timeout,
    InvalidInput,
}

impl ErrorKind {
    /// Human readable label used in summaries
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not found",
            ErrorKind::PermissionDenied => "permission denied",
            ErrorKind::MalformedLink => "malformed link",
            ErrorKind::ProviderError => "provider error",
            ErrorKind::Timeout => "timed out",
            ErrorKind::InvalidInput => "invalid input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors that can occur anywhere in the rename and verification engine
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Access denied for operation '{operation}' on: {key}")]
    PermissionDenied { key: String, operation: String },

    #[error("Malformed presigned link: {reason}")]
    MalformedLink { reason: String },

    #[error("Storage provider error during '{operation}': {message}")]
    Provider { operation: String, message: String },

    #[error("Operation '{operation}' timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            EngineError::MalformedLink { .. } => ErrorKind::MalformedLink,
            EngineError::Provider { .. } => ErrorKind::ProviderError,
            EngineError::Timeout { .. } => ErrorKind::Timeout,
            EngineError::InvalidInput { .. } => ErrorKind::InvalidInput,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn malformed_link(reason: impl Into<String>) -> Self {
        EngineError::MalformedLink {
            reason: reason.into(),
        }
    }

    pub fn provider(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Provider {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::InvalidInput {
            message: err.to_string(),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
