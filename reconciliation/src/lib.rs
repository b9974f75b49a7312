//! Reconciliation & Variance Engine
//!
//! Tracks petroleum product volumes across the custody chain and flags
//! unaccounted-for volume at every handover point.
//!
//! # Architecture
//!
//! A reconciliation run proceeds in fixed steps:
//!
//! 1. **Extraction**: each custody node (vessel discharge, tank receipt,
//!    gantry loading, delivery ePOD) yields declared/metered volume pairs
//!    for the period
//! 2. **Classification**: every pair is scored against the run's
//!    tolerance threshold
//! 3. **Aggregation**: totals and the period variance percentage
//! 4. **Fraud pass**: batch heuristics annotate matching records and
//!    force them into exception
//! 5. **Finalization**: the run auto-closes, or escalates into the
//!    incident workflow
//!
//! # Example
//!
//! ```no_run
//! use reconciliation::{EngineConfig, ReconciliationEngine, TriggerRequest};
//! use custody_core::memory::{InMemoryCustodyData, InMemoryGeofenceData, RecordingIncidentSink};
//! use custody_core::Period;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> reconciliation::Result<()> {
//!     let engine = ReconciliationEngine::new(
//!         Arc::new(InMemoryCustodyData::new()),
//!         Arc::new(InMemoryGeofenceData::new()),
//!         Arc::new(RecordingIncidentSink::new()),
//!         EngineConfig::default(),
//!     );
//!
//!     let period = Period::new(
//!         chrono::Utc::now() - chrono::Duration::days(1),
//!         chrono::Utc::now(),
//!     )?;
//!     let run = engine.trigger(TriggerRequest::manual("daily", period)).await?;
//!     println!("run {} finished as {:?}", run.id, run.status);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod nodes;
pub mod registry;
pub mod tolerance;
pub mod types;

pub use config::EngineConfig;
pub use engine::ReconciliationEngine;
pub use error::{Error, Result};
pub use registry::{RunKey, RunRegistry};
pub use tolerance::{classify, Classification, DEFAULT_TOLERANCE_PCT, TARGET_TOLERANCE_PCT};
pub use types::*;
