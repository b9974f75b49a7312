//! Error types for the reconciliation engine

use thiserror::Error;
use uuid::Uuid;

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciliation errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed trigger input
    #[error("Validation failure: {0}")]
    Validation(String),

    /// Another run already holds the same (scope, period) key
    #[error("Run {0} is already in flight for this period and scope")]
    RunInFlight(Uuid),

    /// Incident collaborator failure during escalation
    #[error("Incident creation failed: {0}")]
    Incident(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Custody domain error
    #[error("Custody error: {0}")]
    Custody(#[from] custody_core::Error),

    /// Fraud engine error
    #[error("Fraud engine error: {0}")]
    Fraud(#[from] fraud_engine::Error),
}
