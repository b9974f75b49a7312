//! Error types for the custody domain core

use thiserror::Error;

/// Custody domain error
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind (e.g. "Trip")
        kind: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Malformed input (bad period, non-positive threshold, ...)
    #[error("Validation failure: {0}")]
    Validation(String),

    /// External data source read failure
    #[error("Custody source error: {0}")]
    Source(String),
}

impl Error {
    /// Shorthand for a `NotFound` error
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
