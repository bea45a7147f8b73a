//! Custom error types for household-settle
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for settlement operations
#[derive(Error, Debug)]
pub enum SettleError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// The requested state change collides with an existing record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller lacks the privilege for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl SettleError {
    /// Create a "not found" error for settlements
    pub fn settlement_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Settlement",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a forbidden error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }
}

impl From<std::io::Error> for SettleError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SettleError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for settlement operations
pub type SettleResult<T> = Result<T, SettleError>;
