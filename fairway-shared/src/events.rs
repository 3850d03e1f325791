use crate::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events carried on a trip's live-location topic.
///
/// `Snapshot` is delivered exactly once to each new subscriber before any
/// live traffic; the other variants are fanned out to every subscriber of
/// the trip's topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    Snapshot {
        trip_id: Uuid,
        status: String,
        driver_location: Option<GeoPoint>,
        start_location: GeoPoint,
        end_location: GeoPoint,
    },
    LocationUpdate {
        trip_id: Uuid,
        latitude: f64,
        longitude: f64,
        recorded_at: i64,
    },
    TripUpdate {
        trip_id: Uuid,
        status: String,
        timestamp: i64,
    },
}
