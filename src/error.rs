//! Error types for hivefile
//!
//! Provides a unified error type for all operations. Lookup misses are not
//! errors; they surface as `Ok(None)` from the reader API.

use thiserror::Error;

/// Result type alias using HiveError
pub type Result<T> = std::result::Result<T, HiveError>;

/// Unified error type for hivefile operations
#[derive(Debug, Error)]
pub enum HiveError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Format Errors (reader side: signature, pointers, chains)
    // -------------------------------------------------------------------------
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Validation Errors (builder side, detected before any bytes commit)
    // -------------------------------------------------------------------------
    #[error("Validation error: {0}")]
    Validation(String),
}
