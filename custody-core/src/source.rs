//! Collaborator traits consumed by the reconciliation and fraud engines
//!
//! The engines never own persistence; everything they read or raise goes
//! through these traits. Production wires them to the platform's data
//! layer, tests and the demo wire them to the in-memory implementations
//! in [`crate::memory`].

use crate::types::*;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Read access to custody event records, filtered by period and optional
/// asset scope. Implementations must never be mutated by callers.
#[async_trait]
pub trait CustodyEventSource: Send + Sync {
    /// Berth schedules whose ETA falls in `period`
    async fn berth_schedules(
        &self,
        period: &Period,
        scope: Option<Uuid>,
    ) -> Result<Vec<BerthSchedule>>;

    /// Trips that departed in `period`
    async fn trips(&self, period: &Period, scope: Option<Uuid>) -> Result<Vec<Trip>>;

    /// Single trip lookup by id
    async fn trip(&self, trip_id: Uuid) -> Result<Option<Trip>>;

    /// Trip/ePOD pairs for trips that departed in `period`
    async fn deliveries(&self, period: &Period, scope: Option<Uuid>) -> Result<Vec<Delivery>>;

    /// The ePOD for a trip, if one has been captured
    async fn epod_for_trip(&self, trip_id: Uuid) -> Result<Option<EPod>>;

    /// Whether any other trip shares `ticket_number`
    async fn ticket_duplicate_exists(
        &self,
        ticket_number: &str,
        exclude_trip: Uuid,
    ) -> Result<bool>;
}

/// Read access to the currently-active geofence zones
#[async_trait]
pub trait GeofenceSource: Send + Sync {
    /// All zones with `is_active = true`
    async fn active_zones(&self) -> Result<Vec<GeofenceZone>>;
}

/// Incident classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentType {
    /// Pipeline or tank leak alarm
    LeakAlarm,
    /// Product quality deviation
    QualityDeviation,
    /// Safety threshold breach
    SafetyThreshold,
    /// Reconciliation variance beyond tolerance
    ReconciliationException,
    /// Suspected meter tampering
    MeterTamper,
    /// Vehicle left its authorized zone
    GeofenceBreach,
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidentType::LeakAlarm => write!(f, "LEAK_ALARM"),
            IncidentType::QualityDeviation => write!(f, "QUALITY_DEVIATION"),
            IncidentType::SafetyThreshold => write!(f, "SAFETY_THRESHOLD"),
            IncidentType::ReconciliationException => write!(f, "RECONCILIATION_EXCEPTION"),
            IncidentType::MeterTamper => write!(f, "METER_TAMPER"),
            IncidentType::GeofenceBreach => write!(f, "GEOFENCE_BREACH"),
        }
    }
}

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncidentSeverity {
    /// Informational
    Low,
    /// Needs follow-up
    Medium,
    /// Needs prompt investigation
    High,
    /// Immediate response
    Critical,
}

/// Incident creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncident {
    /// Incident title
    pub title: String,

    /// Incident classification
    pub incident_type: IncidentType,

    /// Severity
    pub severity: IncidentSeverity,

    /// When the condition was detected
    pub detected_at: DateTime<Utc>,

    /// Free-text description
    pub description: Option<String>,

    /// Affected asset, if scoped
    pub asset_id: Option<Uuid>,
}

/// Incident workflow collaborator. Called at most once per run that
/// transitions into an exception state; the implementation must tolerate
/// duplicate creation across re-triggered runs.
#[async_trait]
pub trait IncidentSink: Send + Sync {
    /// Open an incident, returning its id
    async fn create_incident(&self, incident: NewIncident) -> Result<Uuid>;
}
