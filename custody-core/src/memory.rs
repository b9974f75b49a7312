//! In-memory collaborator implementations for tests and demos

use crate::source::*;
use crate::types::*;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Store {
    berth_schedules: Vec<BerthSchedule>,
    trips: Vec<Trip>,
    epods: Vec<EPod>,
}

fn in_scope(asset_id: Option<Uuid>, scope: Option<Uuid>) -> bool {
    match scope {
        Some(scope) => asset_id == Some(scope),
        None => true,
    }
}

/// In-memory custody record store
#[derive(Clone, Default)]
pub struct InMemoryCustodyData {
    store: Arc<RwLock<Store>>,
}

impl InMemoryCustodyData {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a berth schedule
    pub async fn add_berth_schedule(&self, schedule: BerthSchedule) {
        self.store.write().await.berth_schedules.push(schedule);
    }

    /// Insert a trip
    pub async fn add_trip(&self, trip: Trip) {
        self.store.write().await.trips.push(trip);
    }

    /// Insert an ePOD
    pub async fn add_epod(&self, epod: EPod) {
        self.store.write().await.epods.push(epod);
    }
}

#[async_trait]
impl CustodyEventSource for InMemoryCustodyData {
    async fn berth_schedules(
        &self,
        period: &Period,
        scope: Option<Uuid>,
    ) -> Result<Vec<BerthSchedule>> {
        let store = self.store.read().await;
        Ok(store
            .berth_schedules
            .iter()
            .filter(|s| period.contains(s.eta) && in_scope(s.asset_id, scope))
            .cloned()
            .collect())
    }

    async fn trips(&self, period: &Period, scope: Option<Uuid>) -> Result<Vec<Trip>> {
        let store = self.store.read().await;
        Ok(store
            .trips
            .iter()
            .filter(|t| t.departed_in(period) && in_scope(t.asset_id, scope))
            .cloned()
            .collect())
    }

    async fn trip(&self, trip_id: Uuid) -> Result<Option<Trip>> {
        let store = self.store.read().await;
        Ok(store.trips.iter().find(|t| t.id == trip_id).cloned())
    }

    async fn deliveries(&self, period: &Period, scope: Option<Uuid>) -> Result<Vec<Delivery>> {
        let store = self.store.read().await;
        let mut deliveries = Vec::new();
        for trip in &store.trips {
            if !trip.departed_in(period) || !in_scope(trip.asset_id, scope) {
                continue;
            }
            if let Some(epod) = store.epods.iter().find(|e| e.trip_id == trip.id) {
                deliveries.push(Delivery {
                    trip: trip.clone(),
                    epod: epod.clone(),
                });
            }
        }
        Ok(deliveries)
    }

    async fn epod_for_trip(&self, trip_id: Uuid) -> Result<Option<EPod>> {
        let store = self.store.read().await;
        Ok(store.epods.iter().find(|e| e.trip_id == trip_id).cloned())
    }

    async fn ticket_duplicate_exists(
        &self,
        ticket_number: &str,
        exclude_trip: Uuid,
    ) -> Result<bool> {
        let store = self.store.read().await;
        Ok(store
            .trips
            .iter()
            .any(|t| t.id != exclude_trip && t.ticket_number.as_deref() == Some(ticket_number)))
    }
}

/// In-memory geofence store
#[derive(Clone, Default)]
pub struct InMemoryGeofenceData {
    zones: Arc<RwLock<Vec<GeofenceZone>>>,
}

impl InMemoryGeofenceData {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a zone
    pub async fn add_zone(&self, zone: GeofenceZone) {
        self.zones.write().await.push(zone);
    }
}

#[async_trait]
impl GeofenceSource for InMemoryGeofenceData {
    async fn active_zones(&self) -> Result<Vec<GeofenceZone>> {
        let zones = self.zones.read().await;
        Ok(zones.iter().filter(|z| z.is_active).cloned().collect())
    }
}

/// Incident sink that records every creation call for assertions
#[derive(Clone, Default)]
pub struct RecordingIncidentSink {
    incidents: Arc<RwLock<Vec<NewIncident>>>,
}

impl RecordingIncidentSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All incidents created so far, in order
    pub async fn created(&self) -> Vec<NewIncident> {
        self.incidents.read().await.clone()
    }

    /// Number of creation calls
    pub async fn count(&self) -> usize {
        self.incidents.read().await.len()
    }
}

#[async_trait]
impl IncidentSink for RecordingIncidentSink {
    async fn create_incident(&self, incident: NewIncident) -> Result<Uuid> {
        self.incidents.write().await.push(incident);
        Ok(Uuid::new_v4())
    }
}

/// Custody source whose every read fails, for error-propagation tests
pub struct FailingCustodySource;

macro_rules! source_failure {
    () => {
        Err(Error::Source("custody store unavailable".to_string()))
    };
}

#[async_trait]
impl CustodyEventSource for FailingCustodySource {
    async fn berth_schedules(
        &self,
        _period: &Period,
        _scope: Option<Uuid>,
    ) -> Result<Vec<BerthSchedule>> {
        source_failure!()
    }

    async fn trips(&self, _period: &Period, _scope: Option<Uuid>) -> Result<Vec<Trip>> {
        source_failure!()
    }

    async fn trip(&self, _trip_id: Uuid) -> Result<Option<Trip>> {
        source_failure!()
    }

    async fn deliveries(&self, _period: &Period, _scope: Option<Uuid>) -> Result<Vec<Delivery>> {
        source_failure!()
    }

    async fn epod_for_trip(&self, _trip_id: Uuid) -> Result<Option<EPod>> {
        source_failure!()
    }

    async fn ticket_duplicate_exists(
        &self,
        _ticket_number: &str,
        _exclude_trip: Uuid,
    ) -> Result<bool> {
        source_failure!()
    }
}
