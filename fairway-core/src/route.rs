use fairway_shared::geo::GeoPoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named campus route with a fixed pickup/dropoff pair and surveyed
/// distance. Fare computation reads `distance_km`; nothing recomputes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub distance_km: Decimal,
}

impl Route {
    pub fn new(name: String, pickup: GeoPoint, dropoff: GeoPoint, distance_km: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            pickup,
            dropoff,
            distance_km,
        }
    }

    /// Path planning is intentionally the identity: drive pickup to dropoff.
    pub fn waypoints(&self) -> Vec<GeoPoint> {
        vec![self.pickup, self.dropoff]
    }
}
