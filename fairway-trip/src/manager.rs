use crate::fare::FareSchedule;
use crate::live::TopicRegistry;
use crate::models::{Trip, TripStatus};
use crate::rating;
use chrono::{DateTime, Utc};
use fairway_core::CartStatus;
use fairway_ledger::{LedgerEngine, LedgerError};
use fairway_shared::events::LiveEvent;
use fairway_shared::geo::GeoPoint;
use fairway_store::{Directory, DirectoryError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, RwLock};
use uuid::Uuid;

pub const MIN_SEATS: u8 = 1;
pub const MAX_SEATS: u8 = 4;
pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("trip {0} not found")]
    NotFound(Uuid),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("cannot {op} a trip in state {from:?}")]
    InvalidTransition { from: TripStatus, op: &'static str },

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Drives the trip lifecycle and everything hanging off it: fare
/// computation and the ledger debit on completion, cart/driver assignment
/// and release, rating aggregation, and the per-trip live channel.
///
/// Each trip sits behind its own mutex. Where several entities are held at
/// once the order is always trip, then cart, then driver; wallet locks are
/// only ever taken inside the ledger and never wrap a cart or driver lock.
pub struct TripManager {
    trips: RwLock<HashMap<Uuid, Arc<Mutex<Trip>>>>,
    directory: Arc<Directory>,
    ledger: Arc<LedgerEngine>,
    topics: TopicRegistry,
    fares: FareSchedule,
}

impl TripManager {
    pub fn new(
        directory: Arc<Directory>,
        ledger: Arc<LedgerEngine>,
        fares: FareSchedule,
        channel_capacity: usize,
    ) -> Self {
        Self {
            trips: RwLock::new(HashMap::new()),
            directory,
            ledger,
            topics: TopicRegistry::new(channel_capacity),
            fares,
        }
    }

    /// Request a trip on a route. The fare stays zero until completion.
    pub async fn create(
        &self,
        customer_id: Uuid,
        route_id: Uuid,
        seats: u8,
    ) -> Result<Trip, TripError> {
        if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
            return Err(TripError::Validation(format!(
                "seats must be between {MIN_SEATS} and {MAX_SEATS}, got {seats}"
            )));
        }
        self.directory.user(customer_id).await?;
        let route = self.directory.route(route_id).await?;

        let trip = Trip::new(customer_id, &route, seats);
        self.trips
            .write()
            .await
            .insert(trip.id, Arc::new(Mutex::new(trip.clone())));
        tracing::info!(trip_id = %trip.id, customer_id = %customer_id, "trip requested");
        Ok(trip)
    }

    pub async fn get(&self, trip_id: Uuid) -> Result<Trip, TripError> {
        let entry = self.entry(trip_id).await?;
        let guard = entry.lock().await;
        Ok(guard.clone())
    }

    /// Assign a driver and cart. The cart entry lock serializes racing
    /// accepts: the loser observes the assignment and gets a conflict.
    pub async fn accept(
        &self,
        trip_id: Uuid,
        driver_id: Uuid,
        cart_id: Uuid,
    ) -> Result<Trip, TripError> {
        let entry = self.entry(trip_id).await?;
        let mut trip = entry.lock().await;
        if trip.status != TripStatus::Requested {
            return Err(TripError::InvalidTransition {
                from: trip.status,
                op: "accept",
            });
        }

        let cart_entry = self.directory.cart_entry(cart_id).await?;
        let mut cart = cart_entry.lock().await;
        if cart.status != CartStatus::Active {
            return Err(TripError::Conflict(format!(
                "cart {cart_id} is not in service"
            )));
        }
        if cart.active_trip.is_some() {
            return Err(TripError::Conflict(format!(
                "cart {cart_id} already has an active trip"
            )));
        }
        if trip.seats > cart.capacity {
            return Err(TripError::Validation(format!(
                "trip needs {} seats but cart {cart_id} holds {}",
                trip.seats, cart.capacity
            )));
        }

        let driver_entry = self.directory.user_entry(driver_id).await?;
        let mut driver = driver_entry.lock().await;
        let profile = driver
            .driver_profile_mut()
            .ok_or_else(|| TripError::Validation(format!("user {driver_id} is not a driver")))?;
        if !profile.is_available {
            return Err(TripError::Conflict(format!(
                "driver {driver_id} is not available"
            )));
        }

        profile.is_available = false;
        cart.assign(trip.id, driver_id);
        trip.driver_id = Some(driver_id);
        trip.cart_id = Some(cart_id);
        trip.update_status(TripStatus::Accepted);

        tracing::info!(trip_id = %trip.id, driver_id = %driver_id, cart_id = %cart_id, "trip accepted");
        self.broadcast_status(&trip).await;
        Ok(trip.clone())
    }

    pub async fn start(&self, trip_id: Uuid) -> Result<Trip, TripError> {
        let entry = self.entry(trip_id).await?;
        let mut trip = entry.lock().await;
        if trip.status != TripStatus::Accepted {
            return Err(TripError::InvalidTransition {
                from: trip.status,
                op: "start",
            });
        }

        trip.started_at = Some(Utc::now());
        trip.update_status(TripStatus::Started);
        tracing::info!(trip_id = %trip.id, "trip started");
        self.broadcast_status(&trip).await;
        Ok(trip.clone())
    }

    /// Finish the trip: compute the fare and debit the customer's wallet.
    /// The status flips to COMPLETED only after the debit commits, so an
    /// underfunded wallet leaves the trip STARTED with no payment row.
    pub async fn complete(&self, trip_id: Uuid, end_time: DateTime<Utc>) -> Result<Trip, TripError> {
        let entry = self.entry(trip_id).await?;
        let mut trip = entry.lock().await;
        if trip.status != TripStatus::Started {
            return Err(TripError::InvalidTransition {
                from: trip.status,
                op: "complete",
            });
        }
        let started_at = trip
            .started_at
            .ok_or_else(|| TripError::InvalidState("started trip has no start time".into()))?;
        if end_time < started_at {
            return Err(TripError::Validation(
                "end time precedes the trip start".into(),
            ));
        }

        let duration_minutes = (end_time - started_at).num_minutes();
        let route = self.directory.route(trip.route_id).await?;
        let fare = self.fares.fare(route.distance_km, duration_minutes);

        let wallet_id = self.ledger.wallet_id_for_owner(trip.customer_id).await?;
        self.ledger
            .deduct_funds(wallet_id, fare, Some(trip.id))
            .await?;

        trip.fare = fare;
        trip.duration_minutes = duration_minutes;
        trip.completed_at = Some(end_time);
        trip.update_status(TripStatus::Completed);
        tracing::info!(trip_id = %trip.id, %fare, duration_minutes, "trip completed");

        self.release_assignment(&trip, Some(fare)).await?;
        self.broadcast_status(&trip).await;
        self.topics.close(trip.id).await;
        Ok(trip.clone())
    }

    /// Abort a non-terminal trip. No ledger effect: nothing was charged
    /// before completion.
    pub async fn cancel(&self, trip_id: Uuid) -> Result<Trip, TripError> {
        let entry = self.entry(trip_id).await?;
        let mut trip = entry.lock().await;
        if trip.status.is_terminal() {
            return Err(TripError::InvalidTransition {
                from: trip.status,
                op: "cancel",
            });
        }

        trip.update_status(TripStatus::Cancelled);
        tracing::info!(trip_id = %trip.id, "trip cancelled");

        self.release_assignment(&trip, None).await?;
        self.broadcast_status(&trip).await;
        self.topics.close(trip.id).await;
        Ok(trip.clone())
    }

    /// Rate a completed trip once, folding the value into the driver's
    /// running average.
    pub async fn rate(&self, trip_id: Uuid, value: f64) -> Result<Trip, TripError> {
        if !(MIN_RATING..=MAX_RATING).contains(&value) {
            return Err(TripError::Validation(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {value}"
            )));
        }

        let entry = self.entry(trip_id).await?;
        let mut trip = entry.lock().await;
        if trip.status != TripStatus::Completed {
            return Err(TripError::InvalidTransition {
                from: trip.status,
                op: "rate",
            });
        }
        if trip.rating.is_some() {
            return Err(TripError::InvalidState("trip already rated".into()));
        }
        let driver_id = trip
            .driver_id
            .ok_or_else(|| TripError::InvalidState("completed trip has no driver".into()))?;

        trip.rating = Some(value);
        trip.updated_at = Utc::now();

        let driver_entry = self.directory.user_entry(driver_id).await?;
        let mut driver = driver_entry.lock().await;
        let profile = driver
            .driver_profile_mut()
            .ok_or_else(|| TripError::InvalidState("assigned driver lost their role".into()))?;
        rating::apply_rating(profile, value);
        tracing::info!(trip_id = %trip.id, driver_id = %driver_id, rating = value, new_average = profile.rating, "trip rated");

        Ok(trip.clone())
    }

    /// Open a live subscription. Refused for unknown or terminal trips;
    /// otherwise returns the initial snapshot and the event stream. The
    /// receiver is created under the trip lock so no transition broadcast
    /// can slip between the snapshot and the stream.
    pub async fn subscribe(
        &self,
        trip_id: Uuid,
    ) -> Result<(LiveEvent, broadcast::Receiver<LiveEvent>), TripError> {
        let entry = self.entry(trip_id).await?;
        let trip = entry.lock().await;
        if trip.status.is_terminal() {
            return Err(TripError::InvalidState(format!(
                "trip {trip_id} is no longer live"
            )));
        }

        let driver_location = match trip.driver_id {
            Some(driver_id) => self
                .directory
                .user(driver_id)
                .await?
                .driver_profile()
                .and_then(|p| p.last_location),
            None => None,
        };

        let snapshot = LiveEvent::Snapshot {
            trip_id: trip.id,
            status: trip.status.as_str().to_string(),
            driver_location,
            start_location: trip.start_location,
            end_location: trip.end_location,
        };
        let rx = self.topics.subscribe(trip.id).await;
        Ok((snapshot, rx))
    }

    /// Ingest a driver position: persist it on the driver and cart, then
    /// fan it out to the trip's subscribers.
    pub async fn publish_location(
        &self,
        trip_id: Uuid,
        driver_id: Uuid,
        position: GeoPoint,
    ) -> Result<(), TripError> {
        let entry = self.entry(trip_id).await?;
        let trip = entry.lock().await;
        if trip.status.is_terminal() {
            return Err(TripError::InvalidState(format!(
                "trip {trip_id} is no longer live"
            )));
        }
        if trip.driver_id != Some(driver_id) {
            return Err(TripError::Validation(
                "publisher is not the assigned driver".into(),
            ));
        }

        if let Some(cart_id) = trip.cart_id {
            let cart_entry = self.directory.cart_entry(cart_id).await?;
            let mut cart = cart_entry.lock().await;
            cart.location = Some(position);
            cart.updated_at = Utc::now();
        }

        let driver_entry = self.directory.user_entry(driver_id).await?;
        {
            let mut driver = driver_entry.lock().await;
            if let Some(profile) = driver.driver_profile_mut() {
                profile.last_location = Some(position);
            }
        }

        self.topics
            .publish(
                trip.id,
                LiveEvent::LocationUpdate {
                    trip_id: trip.id,
                    latitude: position.latitude,
                    longitude: position.longitude,
                    recorded_at: Utc::now().timestamp(),
                },
            )
            .await;
        Ok(())
    }

    /// Free the cart and driver after a terminal transition. A fare means
    /// completion: the driver's totals are aggregated here, the single
    /// increment point for `total_trips`.
    async fn release_assignment(
        &self,
        trip: &Trip,
        fare: Option<rust_decimal::Decimal>,
    ) -> Result<(), TripError> {
        if let Some(cart_id) = trip.cart_id {
            let cart_entry = self.directory.cart_entry(cart_id).await?;
            cart_entry.lock().await.release();
        }
        if let Some(driver_id) = trip.driver_id {
            let driver_entry = self.directory.user_entry(driver_id).await?;
            let mut driver = driver_entry.lock().await;
            if let Some(profile) = driver.driver_profile_mut() {
                profile.is_available = true;
                if let Some(fare) = fare {
                    profile.total_trips += 1;
                    profile.total_earnings += fare;
                }
            }
        }
        Ok(())
    }

    async fn broadcast_status(&self, trip: &Trip) {
        self.topics
            .publish(
                trip.id,
                LiveEvent::TripUpdate {
                    trip_id: trip.id,
                    status: trip.status.as_str().to_string(),
                    timestamp: trip.updated_at.timestamp(),
                },
            )
            .await;
    }

    async fn entry(&self, trip_id: Uuid) -> Result<Arc<Mutex<Trip>>, TripError> {
        self.trips
            .read()
            .await
            .get(&trip_id)
            .cloned()
            .ok_or(TripError::NotFound(trip_id))
    }
}
