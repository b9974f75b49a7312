//! Fraud Heuristics Engine for PetroTrace
//!
//! Deterministic threshold rules over delivery records (short-loading,
//! ghost trips, duplicate tickets, off-route destinations) plus the
//! geospatial primitives they rely on. No learned scoring; every check
//! is a fixed rule with a fixed score contribution.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checks;
pub mod error;
pub mod geo;
pub mod types;

pub use checks::FraudDetector;
pub use error::{Error, Result};
pub use types::*;
