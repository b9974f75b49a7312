//! Demo: a daily reconciliation run over in-memory fixtures

use chrono::{TimeZone, Utc};
use custody_core::memory::{InMemoryCustodyData, InMemoryGeofenceData, RecordingIncidentSink};
use custody_core::{BerthSchedule, EPod, Period, Trip};
use reconciliation::{EngineConfig, ReconciliationEngine, TriggerRequest};
use rust_decimal::Decimal;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let custody = InMemoryCustodyData::new();
    let geofences = InMemoryGeofenceData::new();
    let incidents = RecordingIncidentSink::new();

    // A vessel discharge well inside tolerance
    custody
        .add_berth_schedule(BerthSchedule {
            id: Uuid::new_v4(),
            vessel_name: "MT Alexandria".to_string(),
            berth_name: "Jetty 2".to_string(),
            eta: Utc.with_ymd_and_hms(2024, 3, 10, 4, 0, 0).unwrap(),
            bill_of_lading_volume_m3: Some(Decimal::from(45_200)),
            metered_volume_m3: Some(Decimal::from(44_980)),
            asset_id: None,
        })
        .await;

    // A truck loading that will breach the 1.5% tolerance
    let trip = Trip {
        id: Uuid::new_v4(),
        vehicle_registration: "KBX 412T".to_string(),
        destination_name: "Eldoret Depot".to_string(),
        destination: None,
        loaded_volume_litres: Some(Decimal::from(35_000)),
        gantry_metered_litres: Some(Decimal::from(34_000)),
        departure_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
        arrival_time: Some(Utc.with_ymd_and_hms(2024, 3, 10, 16, 0, 0).unwrap()),
        ticket_number: Some("TKT-1001".to_string()),
        actual_route: None,
        asset_id: None,
    };
    custody
        .add_epod(EPod {
            id: Uuid::new_v4(),
            trip_id: trip.id,
            delivered_volume_litres: Decimal::from(33_950),
            receiver_name: Some("Depot clerk".to_string()),
            delivery_time: trip.arrival_time,
            is_verified: true,
        })
        .await;
    custody.add_trip(trip).await;

    let engine = ReconciliationEngine::new(
        Arc::new(custody),
        Arc::new(geofences),
        Arc::new(incidents.clone()),
        EngineConfig::default(),
    );

    let period = Period::new(
        Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap(),
    )?;
    let run = engine
        .trigger(TriggerRequest::manual("2024-03-10 daily", period))
        .await?;

    println!("run {} finished as {}", run.id, run.status);
    if let Some(summary) = &run.summary {
        println!("summary: {summary}");
    }
    for record in &run.variance_records {
        println!(
            "  {}: expected {} m3, actual {} m3, variance {}% ({})",
            record.node,
            record.expected_volume_m3,
            record.actual_volume_m3,
            record.variance_pct.round_dp(2),
            if record.is_exception { "EXCEPTION" } else { "ok" }
        );
    }
    println!("incidents opened: {}", incidents.count().await);

    Ok(())
}
