//! Reconciliation orchestrator
//!
//! Drives a run end-to-end: node extraction, tolerance classification,
//! aggregation, the fraud batch pass, terminal-state decision and
//! incident escalation.

use crate::{
    config::EngineConfig,
    registry::{RunKey, RunRegistry},
    tolerance::classify,
    types::*,
    Error, Result,
};
use chrono::Utc;
use custody_core::{
    CustodyEventSource, GeofenceSource, IncidentSeverity, IncidentSink, IncidentType, NewIncident,
};
use fraud_engine::FraudDetector;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Reconciliation engine
pub struct ReconciliationEngine {
    /// Custody event source
    custody: Arc<dyn CustodyEventSource>,

    /// Incident workflow collaborator
    incidents: Arc<dyn IncidentSink>,

    /// Fraud heuristics engine
    fraud: FraudDetector,

    /// In-flight run keys
    registry: RunRegistry,

    /// Configuration
    config: EngineConfig,
}

impl ReconciliationEngine {
    /// Create a new engine over the collaborator trio
    pub fn new(
        custody: Arc<dyn CustodyEventSource>,
        geofences: Arc<dyn GeofenceSource>,
        incidents: Arc<dyn IncidentSink>,
        config: EngineConfig,
    ) -> Self {
        let fraud = FraudDetector::new(Arc::clone(&custody), geofences);
        Self {
            custody,
            incidents,
            fraud,
            registry: RunRegistry::new(),
            config,
        }
    }

    /// Trigger a reconciliation run and drive it to a terminal state.
    ///
    /// The caller receives either a finalized run or an error with no
    /// run output; there is no partial or resumable state. Re-triggering
    /// the same period later creates an independent run (and, when
    /// exceptions recur, another incident) — only a *concurrent*
    /// duplicate of the same `(scope, period)` key is rejected.
    pub async fn trigger(&self, request: TriggerRequest) -> Result<ReconciliationRun> {
        // Period bounds are checked at construction, but `Period` has
        // public fields and derives Deserialize, so a request that came
        // over the wire may carry an inverted interval anyway.
        if request.period.start >= request.period.end {
            return Err(Error::Validation(format!(
                "period start {} must precede end {}",
                request.period.start, request.period.end
            )));
        }

        let threshold = request
            .tolerance_threshold_pct
            .unwrap_or(self.config.default_tolerance_pct);
        if threshold <= Decimal::ZERO {
            return Err(Error::Validation(format!(
                "tolerance threshold must be positive, got {}",
                threshold
            )));
        }

        let mut run = ReconciliationRun::from_request(&request, threshold);
        let _guard = self.registry.try_acquire(
            RunKey {
                asset_scope: request.asset_scope,
                period: request.period,
            },
            run.id,
        )?;

        run.status = RunStatus::InProgress;
        tracing::info!(
            run_id = %run.id,
            name = %run.name,
            threshold_pct = %threshold,
            "reconciliation run started"
        );

        // Phase 1: extract and classify, node by node, in fixed order
        for node in NodeKind::RECONCILE_ORDER {
            let events = node
                .extract(self.custody.as_ref(), &request.period, request.asset_scope)
                .await?;
            tracing::info!(run_id = %run.id, node = %node, events = events.len(), "node reconciled");

            for event in &events {
                let classification = classify(event.expected_m3, event.actual_m3, threshold);
                run.variance_records
                    .push(VarianceRecord::from_event(run.id, event, &classification));
            }
        }

        // Aggregate totals; an empty run keeps them null
        if !run.variance_records.is_empty() {
            let total_expected: Decimal = run
                .variance_records
                .iter()
                .map(|vr| vr.expected_volume_m3)
                .sum();
            let total_actual: Decimal = run
                .variance_records
                .iter()
                .map(|vr| vr.actual_volume_m3)
                .sum();
            run.total_expected_m3 = Some(total_expected);
            run.total_actual_m3 = Some(total_actual);
            run.total_variance_pct =
                Some(classify(total_expected, total_actual, threshold).variance_pct);
        }

        // Phase 2: fraud batch pass, merged by reference id
        let assessments = self
            .fraud
            .assess_period(&request.period, request.asset_scope)
            .await?;
        for assessment in assessments {
            let reference_id = assessment.trip_id.to_string();
            let annotations = assessment.annotations();
            let mut matched = false;
            for record in run
                .variance_records
                .iter_mut()
                .filter(|vr| vr.reference_id == reference_id)
            {
                record.apply_fraud_annotations(annotations.clone());
                matched = true;
            }
            if !matched {
                tracing::warn!(
                    run_id = %run.id,
                    trip_id = %assessment.trip_id,
                    "fraud assessment matched no variance record"
                );
            }
        }

        // Terminal-state decision
        let exceptions = run.exception_count();
        let summary = format!(
            "{} custody events reconciled, {} exception(s) at ±{}% tolerance",
            run.variance_records.len(),
            exceptions,
            threshold
        );

        if exceptions > 0 {
            self.escalate(&run, threshold).await?;
            run.complete(RunStatus::Exception, summary)?;
        } else {
            run.complete(RunStatus::AutoClosed, summary)?;
        }

        tracing::info!(
            run_id = %run.id,
            status = %run.status,
            records = run.variance_records.len(),
            exceptions,
            "reconciliation run finished"
        );
        Ok(run)
    }

    /// Open the high-severity incident for an exception run. Called at
    /// most once per run.
    async fn escalate(&self, run: &ReconciliationRun, threshold: Decimal) -> Result<()> {
        let incident_id = self
            .incidents
            .create_incident(NewIncident {
                title: format!("Reconciliation exception: {}", run.name),
                incident_type: IncidentType::ReconciliationException,
                severity: IncidentSeverity::High,
                detected_at: Utc::now(),
                description: Some(format!(
                    "Reconciliation run '{}' flagged {} exception(s) exceeding tolerance of ±{}%",
                    run.name,
                    run.exception_count(),
                    threshold
                )),
                asset_id: run.asset_scope,
            })
            .await
            .map_err(|e| Error::Incident(e.to_string()))?;

        tracing::info!(run_id = %run.id, incident_id = %incident_id, "incident opened");
        Ok(())
    }
}
