//! Core types for the custody chain

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Litres per cubic metre, the fixed conversion factor for gantry and
/// delivery volumes recorded in litres.
pub const LITRES_PER_M3: i64 = 1000;

/// Half-open time period `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Inclusive start
    pub start: DateTime<Utc>,

    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl Period {
    /// Create a new period; fails unless `start < end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(Error::Validation(format!(
                "Period start {} must precede end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Half-open containment test: `start <= t < end`
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Geodetic point (WGS84 degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Berth schedule for a vessel call, carrying the declared
/// (bill-of-lading) and metered discharge volumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BerthSchedule {
    /// Schedule ID
    pub id: Uuid,

    /// Vessel name
    pub vessel_name: String,

    /// Berth name
    pub berth_name: String,

    /// Estimated time of arrival (the period anchor for reconciliation)
    pub eta: DateTime<Utc>,

    /// Declared bill-of-lading volume (m³)
    pub bill_of_lading_volume_m3: Option<Decimal>,

    /// Shore-metered discharge volume (m³)
    pub metered_volume_m3: Option<Decimal>,

    /// Owning asset (terminal), if scoped
    pub asset_id: Option<Uuid>,
}

/// Truck trip from gantry loading to delivery destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Trip ID
    pub id: Uuid,

    /// Vehicle registration number
    pub vehicle_registration: String,

    /// Destination name
    pub destination_name: String,

    /// Destination coordinates, when captured
    pub destination: Option<GeoPoint>,

    /// Planned load volume (litres)
    pub loaded_volume_litres: Option<Decimal>,

    /// Gantry-metered load volume (litres)
    pub gantry_metered_litres: Option<Decimal>,

    /// Departure from the gantry
    pub departure_time: Option<DateTime<Utc>>,

    /// Arrival at destination; `None` until the trip completes
    pub arrival_time: Option<DateTime<Utc>>,

    /// Loading ticket number
    pub ticket_number: Option<String>,

    /// GPS breadcrumb trail, when telemetry was recorded
    pub actual_route: Option<Vec<GeoPoint>>,

    /// Owning asset (depot), if scoped
    pub asset_id: Option<Uuid>,
}

impl Trip {
    /// Whether the trip departed within `period`; trips with no recorded
    /// departure are excluded from period queries.
    pub fn departed_in(&self, period: &Period) -> bool {
        self.departure_time.is_some_and(|t| period.contains(t))
    }
}

/// Electronic proof of delivery for a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EPod {
    /// ePOD ID
    pub id: Uuid,

    /// Trip this ePOD belongs to (one per trip)
    pub trip_id: Uuid,

    /// Volume signed for at destination (litres)
    pub delivered_volume_litres: Decimal,

    /// Receiver name
    pub receiver_name: Option<String>,

    /// Delivery timestamp
    pub delivery_time: Option<DateTime<Utc>>,

    /// Whether the ePOD has been back-office verified
    pub is_verified: bool,
}

/// A trip joined with its ePOD — the unit the fraud heuristics and the
/// delivery reconciler operate on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    /// The trip
    pub trip: Trip,

    /// Its proof of delivery
    pub epod: EPod,
}

/// Geofence zone geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZoneShape {
    /// Circular zone
    Circle {
        /// Zone center
        center: GeoPoint,
        /// Radius in meters
        radius_meters: f64,
    },

    /// Polygonal zone, an ordered closed ring of vertices
    Polygon {
        /// Ring vertices
        ring: Vec<GeoPoint>,
    },
}

/// Authorized-area geofence used for off-route detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceZone {
    /// Zone ID
    pub id: Uuid,

    /// Zone name
    pub name: String,

    /// Zone geometry
    pub shape: ZoneShape,

    /// Only active zones participate in off-route checks
    pub is_active: bool,
}
