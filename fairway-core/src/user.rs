use chrono::{DateTime, Utc};
use fairway_shared::geo::GeoPoint;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Driver-specific state attached to a user.
///
/// Rating and the trip/earnings totals are mutated only by the trip
/// completion and rating flows, never written directly by handlers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverProfile {
    pub license_number: String,
    pub rating: f64,
    pub total_trips: u32,
    pub total_earnings: Decimal,
    pub is_available: bool,
    pub last_location: Option<GeoPoint>,
}

impl DriverProfile {
    pub fn new(license_number: String) -> Self {
        Self {
            license_number,
            rating: 5.0,
            total_trips: 0,
            total_earnings: Decimal::ZERO,
            is_available: true,
            last_location: None,
        }
    }
}

/// Role variant a user may hold. A plain account has no role; attaching
/// `Driver` carries the driver state with it so there is no separate
/// driver table sharing the user's primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Customer,
    Driver(DriverProfile),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub is_verified: bool,
    pub is_phone_verified: bool,
    pub role: Option<Role>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, phone_number: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            phone_number,
            is_verified: false,
            is_phone_verified: false,
            role: Some(Role::Customer),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach a driver role. Returns false if the user already drives.
    pub fn attach_driver(&mut self, profile: DriverProfile) -> bool {
        if matches!(self.role, Some(Role::Driver(_))) {
            return false;
        }
        self.role = Some(Role::Driver(profile));
        self.updated_at = Utc::now();
        true
    }

    pub fn driver_profile(&self) -> Option<&DriverProfile> {
        match &self.role {
            Some(Role::Driver(profile)) => Some(profile),
            _ => None,
        }
    }

    pub fn driver_profile_mut(&mut self) -> Option<&mut DriverProfile> {
        self.updated_at = Utc::now();
        match &mut self.role {
            Some(Role::Driver(profile)) => Some(profile),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_driver_is_one_shot() {
        let mut user = User::new("Avery".into(), "avery@campus.edu".into(), None);
        assert!(user.driver_profile().is_none());

        assert!(user.attach_driver(DriverProfile::new("DL-001".into())));
        assert!(!user.attach_driver(DriverProfile::new("DL-002".into())));

        let profile = user.driver_profile().unwrap();
        assert_eq!(profile.license_number, "DL-001");
        assert_eq!(profile.rating, 5.0);
        assert!(profile.is_available);
    }
}
