//! Common error types for MCM

use thiserror::Error;

/// Common result type for MCM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across MCM
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outline document is malformed (wrong JSON shape)
    #[error("Invalid outline shape: {0}")]
    InvalidShape(String),

    /// Outline item is missing a required field
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Outline key reused across roles in one outline
    #[error("Duplicate outline key: {0}")]
    DuplicateKey(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Node hierarchy invariant violated (wrong or missing parent type)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Outline reconciliation failed partway; earlier roles stay applied
    #[error("Partial failure applying role '{role}': {detail}")]
    PartialFailure { role: String, detail: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
