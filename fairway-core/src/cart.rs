use chrono::{DateTime, Utc};
use fairway_shared::geo::GeoPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartType {
    Private,
    Shuttle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    Active,
    Inactive,
    Maintenance,
}

/// A golf cart in the campus fleet. At most one active trip at a time,
/// and at most one cart assigned to a driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GolfCart {
    pub id: Uuid,
    pub cart_type: CartType,
    pub driver_id: Option<Uuid>,
    pub status: CartStatus,
    pub capacity: u8,
    pub location: Option<GeoPoint>,
    pub active_trip: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GolfCart {
    pub fn new(cart_type: CartType, capacity: u8) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cart_type,
            driver_id: None,
            status: CartStatus::Active,
            capacity,
            location: None,
            active_trip: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bind the cart to a trip and its driver.
    pub fn assign(&mut self, trip_id: Uuid, driver_id: Uuid) {
        self.active_trip = Some(trip_id);
        self.driver_id = Some(driver_id);
        self.updated_at = Utc::now();
    }

    /// Move the cart in or out of service.
    pub fn set_status(&mut self, status: CartStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Free the cart when its trip reaches a terminal state.
    pub fn release(&mut self) {
        self.active_trip = None;
        self.driver_id = None;
        self.updated_at = Utc::now();
    }
}
