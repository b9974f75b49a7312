//! Core types for reconciliation runs

use crate::tolerance::Classification;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Run lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Created, not yet processing (instantaneous)
    Pending,
    /// Node reconciliation in flight
    InProgress,
    /// Terminal: at least one exception, incident raised
    Exception,
    /// Terminal: every record within tolerance
    AutoClosed,
}

impl RunStatus {
    /// Whether the run can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Exception | RunStatus::AutoClosed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Pending => write!(f, "PENDING"),
            RunStatus::InProgress => write!(f, "IN_PROGRESS"),
            RunStatus::Exception => write!(f, "EXCEPTION"),
            RunStatus::AutoClosed => write!(f, "AUTO_CLOSED"),
        }
    }
}

/// How the run was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunKind {
    /// Scheduler-driven (e.g. daily)
    Scheduled,
    /// Operator-driven
    Manual,
}

/// Custody node kind — a closed set; adding a node means adding a
/// variant and its extractor, not subclassing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Vessel discharge at the import berth
    VesselDischarge,
    /// Tank receipt (reserved, extractor not yet implemented)
    TankReceipt,
    /// Gantry truck-loading
    GantryLoading,
    /// Final delivery against ePOD
    DeliveryEpod,
}

impl NodeKind {
    /// Fixed order nodes are reconciled in
    pub const RECONCILE_ORDER: [NodeKind; 4] = [
        NodeKind::VesselDischarge,
        NodeKind::TankReceipt,
        NodeKind::GantryLoading,
        NodeKind::DeliveryEpod,
    ];
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::VesselDischarge => write!(f, "VESSEL_DISCHARGE"),
            NodeKind::TankReceipt => write!(f, "TANK_RECEIPT"),
            NodeKind::GantryLoading => write!(f, "GANTRY_LOADING"),
            NodeKind::DeliveryEpod => write!(f, "DELIVERY_EPOD"),
        }
    }
}

/// A declared/metered volume pair produced by a node extractor.
/// Derived on demand from the underlying custody records, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyEvent {
    /// Producing node
    pub node: NodeKind,

    /// Id of the originating record, used to correlate with the fraud pass
    pub reference_id: String,

    /// Declared volume (m³)
    pub expected_m3: Decimal,

    /// Metered volume (m³)
    pub actual_m3: Decimal,

    /// When the handover occurred
    pub occurred_at: DateTime<Utc>,
}

/// One reconciled custody event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceRecord {
    /// Record ID
    pub id: Uuid,

    /// Owning run
    pub run_id: Uuid,

    /// Custody node the event came from
    pub node: NodeKind,

    /// Declared volume (m³)
    pub expected_volume_m3: Decimal,

    /// Metered volume (m³)
    pub actual_volume_m3: Decimal,

    /// Signed variance, actual − expected (m³)
    pub variance_m3: Decimal,

    /// Variance percent against the declared volume
    pub variance_pct: Decimal,

    /// Out of tolerance, or force-flagged by the fraud pass
    pub is_exception: bool,

    /// Fraud annotations (heuristic name → detail), set at most once
    pub fraud_checks: Option<Map<String, Value>>,

    /// Originating record id
    pub reference_id: String,

    /// Free-text notes
    pub notes: Option<String>,
}

impl VarianceRecord {
    /// Build a record from an extracted event and its classification
    pub fn from_event(run_id: Uuid, event: &CustodyEvent, classification: &Classification) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_id,
            node: event.node,
            expected_volume_m3: classification.expected_m3,
            actual_volume_m3: classification.actual_m3,
            variance_m3: classification.variance_m3,
            variance_pct: classification.variance_pct,
            is_exception: !classification.within_tolerance,
            fraud_checks: None,
            reference_id: event.reference_id.clone(),
            notes: None,
        }
    }

    /// Merge the fraud pass result in. Forces the exception flag; the
    /// annotations are written exactly once.
    pub fn apply_fraud_annotations(&mut self, annotations: Map<String, Value>) {
        debug_assert!(self.fraud_checks.is_none(), "fraud pass merged twice");
        self.fraud_checks = Some(annotations);
        self.is_exception = true;
    }
}

/// Trigger input for a reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRequest {
    /// Human-readable run name
    pub name: String,

    /// Scheduled or manual
    pub kind: RunKind,

    /// Period to reconcile, half-open
    pub period: custody_core::Period,

    /// Optional asset scope
    pub asset_scope: Option<Uuid>,

    /// Tolerance threshold (percent); engine default when `None`
    pub tolerance_threshold_pct: Option<Decimal>,

    /// Triggering actor
    pub triggered_by: Option<Uuid>,
}

impl TriggerRequest {
    /// Manual run over `period` with engine defaults
    pub fn manual(name: impl Into<String>, period: custody_core::Period) -> Self {
        Self {
            name: name.into(),
            kind: RunKind::Manual,
            period,
            asset_scope: None,
            tolerance_threshold_pct: None,
            triggered_by: None,
        }
    }

    /// Scheduled run over `period` with engine defaults
    pub fn scheduled(name: impl Into<String>, period: custody_core::Period) -> Self {
        Self {
            kind: RunKind::Scheduled,
            ..Self::manual(name, period)
        }
    }
}

/// One reconciliation run and its variance records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRun {
    /// Run ID
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Lifecycle state
    pub status: RunStatus,

    /// Scheduled or manual
    pub kind: RunKind,

    /// Reconciled period
    pub period: custody_core::Period,

    /// Optional asset scope
    pub asset_scope: Option<Uuid>,

    /// Tolerance applied to every record in the run (percent)
    pub tolerance_threshold_pct: Decimal,

    /// Sum of expected volumes; `None` until node reconciliation
    /// completes, and left `None` for an empty run
    pub total_expected_m3: Option<Decimal>,

    /// Sum of actual volumes
    pub total_actual_m3: Option<Decimal>,

    /// Period variance percent derived from the totals
    pub total_variance_pct: Option<Decimal>,

    /// One-line outcome summary
    pub summary: Option<String>,

    /// Completion timestamp, set on reaching a terminal state
    pub completed_at: Option<DateTime<Utc>>,

    /// Triggering actor
    pub triggered_by: Option<Uuid>,

    /// Variance records in node-reconciliation order
    pub variance_records: Vec<VarianceRecord>,
}

impl ReconciliationRun {
    /// Create a pending run from a trigger request
    pub fn from_request(request: &TriggerRequest, tolerance_threshold_pct: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            status: RunStatus::Pending,
            kind: request.kind,
            period: request.period,
            asset_scope: request.asset_scope,
            tolerance_threshold_pct,
            total_expected_m3: None,
            total_actual_m3: None,
            total_variance_pct: None,
            summary: None,
            completed_at: None,
            triggered_by: request.triggered_by,
            variance_records: Vec::new(),
        }
    }

    /// Whether any record is flagged as an exception
    pub fn has_exceptions(&self) -> bool {
        self.variance_records.iter().any(|vr| vr.is_exception)
    }

    /// Number of exception records
    pub fn exception_count(&self) -> usize {
        self.variance_records
            .iter()
            .filter(|vr| vr.is_exception)
            .count()
    }

    /// Move a non-terminal run into a terminal state, stamping the
    /// completion time. Terminal runs are immutable; a second completion
    /// attempt is a validation error.
    pub fn complete(&mut self, status: RunStatus, summary: String) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::Validation(format!(
                "run {} is already terminal ({})",
                self.id, self.status
            )));
        }
        if !status.is_terminal() {
            return Err(Error::Validation(format!(
                "{} is not a terminal status",
                status
            )));
        }
        self.status = status;
        self.summary = Some(summary);
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use custody_core::Period;

    fn request() -> TriggerRequest {
        let period = Period::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap(),
        )
        .unwrap();
        TriggerRequest::manual("daily", period)
    }

    #[test]
    fn test_terminal_runs_are_immutable() {
        let mut run = ReconciliationRun::from_request(&request(), Decimal::new(15, 1));
        run.status = RunStatus::InProgress;
        run.complete(RunStatus::AutoClosed, "clean".to_string())
            .unwrap();
        assert!(run.completed_at.is_some());

        let err = run.complete(RunStatus::Exception, "again".to_string());
        assert!(err.is_err());
        assert_eq!(run.status, RunStatus::AutoClosed);
    }

    #[test]
    fn test_complete_rejects_non_terminal_target() {
        let mut run = ReconciliationRun::from_request(&request(), Decimal::new(15, 1));
        assert!(run
            .complete(RunStatus::InProgress, "nope".to_string())
            .is_err());
    }

    #[test]
    fn test_node_order_is_fixed() {
        assert_eq!(
            NodeKind::RECONCILE_ORDER,
            [
                NodeKind::VesselDischarge,
                NodeKind::TankReceipt,
                NodeKind::GantryLoading,
                NodeKind::DeliveryEpod,
            ]
        );
    }
}
