//! Core types for the fraud engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Score at or above which an assessment lands in the medium band.
/// A single ghost trip (40) stays low; ghost trip plus any second
/// heuristic crosses into medium.
pub const MEDIUM_RISK_THRESHOLD: u8 = 50;

/// Score at or above which an assessment lands in the high band
pub const HIGH_RISK_THRESHOLD: u8 = 75;

/// Capped fraud score. Heuristic weights sum to more than 100 when
/// everything fires at once, so the constructor saturates rather than
/// letting the total escape the band scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FraudScore(u8);

impl FraudScore {
    /// Build a score from a raw weight sum, saturating at 100
    pub fn new(total: u32) -> Self {
        Self(total.min(100) as u8)
    }

    /// Raw score value
    pub fn score(&self) -> u8 {
        self.0
    }

    /// The risk band this score falls in
    pub fn band(&self) -> RiskLevel {
        match self.0 {
            s if s >= HIGH_RISK_THRESHOLD => RiskLevel::High,
            s if s >= MEDIUM_RISK_THRESHOLD => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Below the medium band cut-off
    pub fn is_low_risk(&self) -> bool {
        self.band() == RiskLevel::Low
    }
}

/// Risk band for a fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
}

/// A triggered fraud heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FraudFlag {
    /// Delivered volume exceeds the gantry-metered load
    ShortLoad,
    /// Delivery claimed without a completed trip
    GhostTrip,
    /// Another trip shares the same ticket number
    DuplicateTicket,
    /// Destination outside every active geofence
    OffRoute,
}

impl FraudFlag {
    /// Score contribution when the heuristic triggers
    pub fn weight(&self) -> u32 {
        match self {
            FraudFlag::ShortLoad => 30,
            FraudFlag::GhostTrip => 40,
            FraudFlag::DuplicateTicket => 25,
            FraudFlag::OffRoute => 20,
        }
    }
}

impl fmt::Display for FraudFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FraudFlag::ShortLoad => write!(f, "SHORT_LOAD"),
            FraudFlag::GhostTrip => write!(f, "GHOST_TRIP"),
            FraudFlag::DuplicateTicket => write!(f, "DUPLICATE_TICKET"),
            FraudFlag::OffRoute => write!(f, "OFF_ROUTE"),
        }
    }
}

/// Fraud assessment for a single trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Assessed trip
    pub trip_id: Uuid,

    /// Total score, capped at 100
    pub score: FraudScore,

    /// Risk band
    pub risk_level: RiskLevel,

    /// Triggered heuristics, in check order
    pub flags: Vec<FraudFlag>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

impl FraudAssessment {
    /// Build an assessment from the triggered flags
    pub fn from_flags(trip_id: Uuid, flags: Vec<FraudFlag>) -> Self {
        let score = FraudScore::new(flags.iter().map(FraudFlag::weight).sum());
        Self {
            trip_id,
            score,
            risk_level: score.band(),
            flags,
            assessed_at: Utc::now(),
        }
    }

    /// Whether any heuristic triggered
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Annotation map (heuristic name -> true) for merging into a
    /// variance record's `fraud_checks`
    pub fn annotations(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for flag in &self.flags {
            map.insert(flag.to_string(), Value::Bool(true));
        }
        map.insert("score".to_string(), Value::from(self.score.score()));
        map
    }
}
