//! Error types for the fraud engine

use thiserror::Error;

/// Fraud engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Custody domain error (missing trip, source failure, ...)
    #[error("Custody error: {0}")]
    Custody(#[from] custody_core::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
