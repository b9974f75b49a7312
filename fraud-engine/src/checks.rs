//! Deterministic fraud heuristics over delivery records
//!
//! Each check is independent and additive: absence of the data a check
//! needs means the check is skipped, never failed. Per-trip mode runs
//! all four heuristics; period batch mode (used by reconciliation runs)
//! evaluates only short-load and ghost-trip, the two checks that read
//! nothing beyond the delivery pair itself.

use crate::geo::{self, CorridorDeviation};
use crate::types::{FraudAssessment, FraudFlag};
use crate::Result;
use custody_core::{
    CustodyEventSource, Delivery, Error as CustodyError, GeoPoint, GeofenceSource, Period, Trip,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Fraud detector over the custody and geofence collaborators
pub struct FraudDetector {
    custody: Arc<dyn CustodyEventSource>,
    geofences: Arc<dyn GeofenceSource>,
}

impl FraudDetector {
    /// Create a new detector
    pub fn new(custody: Arc<dyn CustodyEventSource>, geofences: Arc<dyn GeofenceSource>) -> Self {
        Self { custody, geofences }
    }

    /// Assess a single trip with the full heuristic set.
    ///
    /// Fails with `NotFound` when the trip does not exist; a missing
    /// ePOD simply skips the delivery-dependent checks.
    pub async fn assess_trip(&self, trip_id: Uuid) -> Result<FraudAssessment> {
        let trip = self
            .custody
            .trip(trip_id)
            .await?
            .ok_or_else(|| CustodyError::not_found("Trip", trip_id))?;
        let epod = self.custody.epod_for_trip(trip_id).await?;

        let mut flags = Vec::new();

        if let Some(epod) = &epod {
            flags.extend(delivery_flags(&trip, epod.delivered_volume_litres));
        }

        if let Some(ticket) = &trip.ticket_number {
            if self
                .custody
                .ticket_duplicate_exists(ticket, trip.id)
                .await?
            {
                flags.push(FraudFlag::DuplicateTicket);
            }
        }

        if let Some(destination) = trip.destination {
            let zones = self.geofences.active_zones().await?;
            // No active zones means the check cannot discriminate
            if !zones.is_empty()
                && !zones
                    .iter()
                    .any(|z| geo::point_in_zone(destination, &z.shape))
            {
                flags.push(FraudFlag::OffRoute);
            }
        }

        let assessment = FraudAssessment::from_flags(trip.id, flags);
        if assessment.is_flagged() {
            tracing::debug!(
                trip_id = %trip.id,
                score = assessment.score.score(),
                ?assessment.flags,
                "fraud heuristics triggered"
            );
        }
        Ok(assessment)
    }

    /// Batch mode over all deliveries in a period: short-load and
    /// ghost-trip only. Returns one assessment per flagged delivery,
    /// keyed by trip id.
    pub async fn assess_period(
        &self,
        period: &Period,
        scope: Option<Uuid>,
    ) -> Result<Vec<FraudAssessment>> {
        let deliveries = self.custody.deliveries(period, scope).await?;

        let mut assessments = Vec::new();
        for Delivery { trip, epod } in deliveries {
            let flags = delivery_flags(&trip, epod.delivered_volume_litres);
            if !flags.is_empty() {
                assessments.push(FraudAssessment::from_flags(trip.id, flags));
            }
        }

        tracing::info!(
            flagged = assessments.len(),
            "fraud batch assessment complete"
        );
        Ok(assessments)
    }
}

/// The two delivery-pair checks shared by both modes
fn delivery_flags(trip: &Trip, delivered_litres: Decimal) -> Vec<FraudFlag> {
    let mut flags = Vec::new();

    // Short-load: more volume signed for than the gantry metered out
    if let Some(metered) = trip.gantry_metered_litres {
        if metered < delivered_litres {
            flags.push(FraudFlag::ShortLoad);
        }
    }

    // Ghost trip: delivery claimed without a completed trip
    if trip.arrival_time.is_none() && delivered_litres > Decimal::ZERO {
        flags.push(FraudFlag::GhostTrip);
    }

    flags
}

/// Corridor deviation report for a trip's recorded route. Trips without
/// telemetry yield no deviations.
pub fn route_deviations<'a>(
    trip: &'a Trip,
    centerline: &'a [GeoPoint],
    corridor_width_meters: f64,
) -> impl Iterator<Item = CorridorDeviation> + 'a {
    let route = trip.actual_route.as_deref().unwrap_or(&[]);
    geo::corridor_deviations(route, centerline, corridor_width_meters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use custody_core::memory::{InMemoryCustodyData, InMemoryGeofenceData};
    use custody_core::{EPod, GeofenceZone, ZoneShape};

    fn base_trip() -> Trip {
        Trip {
            id: Uuid::new_v4(),
            vehicle_registration: "KCD 903L".to_string(),
            destination_name: "Nakuru Depot".to_string(),
            destination: None,
            loaded_volume_litres: Some(Decimal::from(35_000)),
            gantry_metered_litres: Some(Decimal::from(35_000)),
            departure_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap()),
            arrival_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 13, 0, 0).unwrap()),
            ticket_number: Some("TKT-7001".to_string()),
            actual_route: None,
            asset_id: None,
        }
    }

    fn epod_for(trip: &Trip, delivered: i64) -> EPod {
        EPod {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            delivered_volume_litres: Decimal::from(delivered),
            receiver_name: Some("Depot clerk".to_string()),
            delivery_time: trip.arrival_time,
            is_verified: true,
        }
    }

    async fn detector_with(
        trips: Vec<Trip>,
        epods: Vec<EPod>,
        zones: Vec<GeofenceZone>,
    ) -> FraudDetector {
        let custody = InMemoryCustodyData::new();
        for trip in trips {
            custody.add_trip(trip).await;
        }
        for epod in epods {
            custody.add_epod(epod).await;
        }
        let geofences = InMemoryGeofenceData::new();
        for zone in zones {
            geofences.add_zone(zone).await;
        }
        FraudDetector::new(Arc::new(custody), Arc::new(geofences))
    }

    #[tokio::test]
    async fn test_short_load_detection() {
        let trip = base_trip();
        let epod = epod_for(&trip, 35_500);
        let detector = detector_with(vec![trip.clone()], vec![epod], vec![]).await;

        let assessment = detector.assess_trip(trip.id).await.unwrap();
        assert!(assessment.flags.contains(&FraudFlag::ShortLoad));
        assert!(assessment.score.score() >= 30);
    }

    #[tokio::test]
    async fn test_ghost_trip_detection() {
        let mut trip = base_trip();
        trip.arrival_time = None;
        let epod = epod_for(&trip, 34_000);
        let detector = detector_with(vec![trip.clone()], vec![epod], vec![]).await;

        let assessment = detector.assess_trip(trip.id).await.unwrap();
        assert!(assessment.flags.contains(&FraudFlag::GhostTrip));
    }

    #[tokio::test]
    async fn test_duplicate_ticket_detection() {
        let trip = base_trip();
        let mut other = base_trip();
        other.id = Uuid::new_v4();
        let detector = detector_with(vec![trip.clone(), other], vec![], vec![]).await;

        let assessment = detector.assess_trip(trip.id).await.unwrap();
        assert_eq!(assessment.flags, vec![FraudFlag::DuplicateTicket]);
        assert_eq!(assessment.score.score(), 25);
    }

    #[tokio::test]
    async fn test_off_route_requires_an_active_zone() {
        let mut trip = base_trip();
        trip.destination = Some(GeoPoint::new(-4.04, 39.66));

        // No zones at all: the check is skipped
        let detector = detector_with(vec![trip.clone()], vec![], vec![]).await;
        let assessment = detector.assess_trip(trip.id).await.unwrap();
        assert!(!assessment.flags.contains(&FraudFlag::OffRoute));

        // One active zone far away: flagged
        let zone = GeofenceZone {
            id: Uuid::new_v4(),
            name: "Nairobi depots".to_string(),
            shape: ZoneShape::Circle {
                center: GeoPoint::new(-1.29, 36.82),
                radius_meters: 10_000.0,
            },
            is_active: true,
        };
        let detector = detector_with(vec![trip.clone()], vec![], vec![zone]).await;
        let assessment = detector.assess_trip(trip.id).await.unwrap();
        assert!(assessment.flags.contains(&FraudFlag::OffRoute));
    }

    #[tokio::test]
    async fn test_destination_inside_polygon_zone_is_on_route() {
        let mut trip = base_trip();
        trip.destination = Some(GeoPoint::new(0.5, 0.5));
        let zone = GeofenceZone {
            id: Uuid::new_v4(),
            name: "Authorized delta".to_string(),
            shape: ZoneShape::Polygon {
                ring: vec![
                    GeoPoint::new(0.0, 0.0),
                    GeoPoint::new(0.0, 1.0),
                    GeoPoint::new(1.0, 1.0),
                    GeoPoint::new(1.0, 0.0),
                ],
            },
            is_active: true,
        };
        let detector = detector_with(vec![trip.clone()], vec![], vec![zone]).await;

        let assessment = detector.assess_trip(trip.id).await.unwrap();
        assert!(!assessment.flags.contains(&FraudFlag::OffRoute));
    }

    #[tokio::test]
    async fn test_missing_epod_skips_delivery_checks() {
        let mut trip = base_trip();
        trip.arrival_time = None;
        let detector = detector_with(vec![trip.clone()], vec![], vec![]).await;

        let assessment = detector.assess_trip(trip.id).await.unwrap();
        // Ghost-trip needs a delivered volume; without an ePOD nothing fires
        assert!(assessment.flags.is_empty());
        assert!(assessment.score.is_low_risk());
    }

    #[test]
    fn test_route_deviations_reads_trip_telemetry() {
        let centerline = vec![GeoPoint::new(-1.2921, 36.8219)];

        // No recorded route: nothing to flag
        let mut trip = base_trip();
        assert_eq!(route_deviations(&trip, &centerline, 2_000.0).count(), 0);

        // One breadcrumb near the centerline, one far off it
        trip.actual_route = Some(vec![
            GeoPoint::new(-1.2925, 36.8221),
            GeoPoint::new(-4.0435, 39.6682),
        ]);
        let deviations: Vec<_> = route_deviations(&trip, &centerline, 2_000.0).collect();
        assert_eq!(deviations.len(), 1);
        assert_eq!(deviations[0].point_index, 1);
        assert!(deviations[0].exceeds_by_m > 0.0);
    }

    #[tokio::test]
    async fn test_unknown_trip_is_not_found() {
        let detector = detector_with(vec![], vec![], vec![]).await;
        let err = detector.assess_trip(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Custody(CustodyError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_batch_mode_limits_to_delivery_checks() {
        // Duplicate tickets and a far-away destination, but batch mode
        // must only surface the short-load
        let mut trip = base_trip();
        trip.destination = Some(GeoPoint::new(-4.04, 39.66));
        let mut dup = trip.clone();
        dup.id = Uuid::new_v4();
        let epod = epod_for(&trip, 36_000);

        let zone = GeofenceZone {
            id: Uuid::new_v4(),
            name: "Nairobi depots".to_string(),
            shape: ZoneShape::Circle {
                center: GeoPoint::new(-1.29, 36.82),
                radius_meters: 10_000.0,
            },
            is_active: true,
        };
        let detector = detector_with(vec![trip.clone(), dup], vec![epod], vec![zone]).await;

        let period = Period::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let assessments = detector.assess_period(&period, None).await.unwrap();

        assert_eq!(assessments.len(), 1);
        assert_eq!(assessments[0].trip_id, trip.id);
        assert_eq!(assessments[0].flags, vec![FraudFlag::ShortLoad]);
    }
}
