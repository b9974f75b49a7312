//! Custody-chain domain core for PetroTrace
//!
//! Shared record types for the physical custody chain (vessel discharge,
//! tank storage, gantry loading, delivery) plus the collaborator traits
//! the reconciliation and fraud engines consume.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use source::{
    CustodyEventSource, GeofenceSource, IncidentSeverity, IncidentSink, IncidentType, NewIncident,
};
pub use types::*;
