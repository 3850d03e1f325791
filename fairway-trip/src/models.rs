use chrono::{DateTime, Utc};
use fairway_core::Route;
use fairway_shared::geo::GeoPoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trip lifecycle. Legal transitions are REQUESTED → ACCEPTED → STARTED →
/// COMPLETED, with CANCELLED reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Requested,
    Accepted,
    Started,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TripStatus::Completed | TripStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Requested => "REQUESTED",
            TripStatus::Accepted => "ACCEPTED",
            TripStatus::Started => "STARTED",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
    pub route_id: Uuid,
    pub start_location: GeoPoint,
    pub end_location: GeoPoint,
    pub seats: u8,
    /// Computed at completion, never client-supplied.
    pub fare: Decimal,
    pub duration_minutes: i64,
    pub status: TripStatus,
    pub rating: Option<f64>,
    pub requested_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(customer_id: Uuid, route: &Route, seats: u8) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            driver_id: None,
            cart_id: None,
            route_id: route.id,
            start_location: route.pickup,
            end_location: route.dropoff,
            seats,
            fare: Decimal::ZERO,
            duration_minutes: 0,
            status: TripStatus::Requested,
            rating: None,
            requested_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, new_status: TripStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }
}
