//! Error types for plant-care core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages.

use thiserror::Error;

/// Result type alias for plant-care operations.
pub type Result<T> = std::result::Result<T, CareError>;

/// Core error type for plant-care operations.
#[derive(Debug, Error)]
pub enum CareError {
    /// Malformed or out-of-range input (future-dated fields, out-of-bounds
    /// sensor values, inverted optimal ranges). Rejected before reaching
    /// the engines, never silently clamped.
    #[error("Validation error: {0}")]
    Validation(String),

    /// State conflict (completing an already-completed task, skipping a
    /// completed or already-skipped task). Engine state is unchanged.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource exists but belongs to another user. Callers must not be
    /// able to distinguish other users' data from data that does not exist,
    /// so the message carries no identifying detail.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Premium-gated feature invoked without an active subscription
    #[error("Premium required: {0}")]
    Entitlement(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for CareError {
    fn from(err: std::io::Error) -> Self {
        CareError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CareError {
    fn from(err: serde_json::Error) -> Self {
        CareError::Validation(err.to_string())
    }
}
