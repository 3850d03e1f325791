use crate::error::AppError;
use crate::state::AppState;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use fairway_shared::events::LiveEvent;
use fairway_shared::geo::GeoPoint;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/trips/{id}/live", get(live_stream))
}

#[derive(Debug, Deserialize)]
struct LiveParams {
    /// Set by the driver's connection; frames from sockets without it are
    /// dropped rather than applied.
    driver: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
struct LocationFrame {
    latitude: f64,
    longitude: f64,
}

/// Subscribe to a trip's live channel. The subscription is validated
/// before the protocol upgrade so unknown or terminal trips are refused
/// with a proper status instead of a dangling socket.
async fn live_stream(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Query(params): Query<LiveParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let (snapshot, rx) = state.trips.subscribe(trip_id).await?;
    Ok(ws.on_upgrade(move |socket| {
        serve_connection(socket, state, trip_id, params.driver, snapshot, rx)
    }))
}

async fn serve_connection(
    mut socket: WebSocket,
    state: AppState,
    trip_id: Uuid,
    driver: Option<Uuid>,
    snapshot: LiveEvent,
    mut rx: broadcast::Receiver<LiveEvent>,
) {
    if !send_event(&mut socket, &snapshot).await {
        return;
    }

    let idle_timeout = Duration::from_secs(state.live.idle_timeout_seconds);
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if !send_event(&mut socket, &event).await {
                        break;
                    }
                    idle.as_mut().reset(tokio::time::Instant::now() + idle_timeout);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(trip_id = %trip_id, skipped, "slow live subscriber dropped events");
                }
                // Topic closed: the trip reached a terminal state.
                Err(broadcast::error::RecvError::Closed) => break,
            },
            frame = socket.recv() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(&state, trip_id, driver, text.as_str()).await;
                    idle.as_mut().reset(tokio::time::Instant::now() + idle_timeout);
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    idle.as_mut().reset(tokio::time::Instant::now() + idle_timeout);
                }
                Some(Err(err)) => {
                    tracing::debug!(trip_id = %trip_id, %err, "live socket error");
                    break;
                }
            },
            () = &mut idle => {
                tracing::info!(trip_id = %trip_id, "live connection idle, dropping");
                break;
            }
        }
    }
}

/// Apply one inbound frame. Bad payloads and unauthorized publishers are
/// logged and dropped; the connection stays open either way.
async fn handle_frame(state: &AppState, trip_id: Uuid, driver: Option<Uuid>, text: &str) {
    let frame: LocationFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(trip_id = %trip_id, %err, "malformed location payload dropped");
            return;
        }
    };
    let Some(driver_id) = driver else {
        tracing::warn!(trip_id = %trip_id, "location frame from non-driver connection dropped");
        return;
    };

    if let Err(err) = state
        .trips
        .publish_location(
            trip_id,
            driver_id,
            GeoPoint::new(frame.latitude, frame.longitude),
        )
        .await
    {
        tracing::warn!(trip_id = %trip_id, %err, "location update rejected");
    }
}

async fn send_event(socket: &mut WebSocket, event: &LiveEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(err) => {
            tracing::error!(%err, "failed to encode live event");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairway_core::{CartType, DriverProfile, GolfCart, Route, User};
    use fairway_store::app_config::{BusinessRules, LiveConfig};
    use rust_decimal_macros::dec;
    use tokio::sync::broadcast::error::TryRecvError;

    async fn started_trip() -> (AppState, Uuid, Uuid) {
        let state = AppState::new(&BusinessRules::default(), LiveConfig::default());

        let customer = User::new("Riley".into(), "riley@campus.edu".into(), None);
        let customer_id = state.directory.insert_user(customer).await;
        state.ledger.create_wallet(customer_id).await.unwrap();

        let mut driver = User::new("Jordan".into(), "jordan@campus.edu".into(), None);
        driver.attach_driver(DriverProfile::new("DL-42".into()));
        let driver_id = state.directory.insert_user(driver).await;

        let cart_id = state
            .directory
            .insert_cart(GolfCart::new(CartType::Private, 4))
            .await;
        let route_id = state
            .directory
            .insert_route(Route::new(
                "Quad → Gym".into(),
                GeoPoint::new(29.6486, -82.3431),
                GeoPoint::new(29.6500, -82.3487),
                dec!(1),
            ))
            .await;

        let trip = state.trips.create(customer_id, route_id, 1).await.unwrap();
        state.trips.accept(trip.id, driver_id, cart_id).await.unwrap();
        state.trips.start(trip.id).await.unwrap();
        (state, trip.id, driver_id)
    }

    #[tokio::test]
    async fn malformed_frames_are_dropped_without_effect() {
        let (state, trip_id, driver_id) = started_trip().await;
        let (_, mut rx) = state.trips.subscribe(trip_id).await.unwrap();

        handle_frame(&state, trip_id, Some(driver_id), "not json at all").await;
        handle_frame(&state, trip_id, Some(driver_id), r#"{"latitude": "north"}"#).await;
        handle_frame(&state, trip_id, Some(driver_id), r#"{"latitude": 29.65}"#).await;

        // Nothing reached the channel and nothing stuck to the driver.
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        let driver = state.directory.user(driver_id).await.unwrap();
        assert!(driver.driver_profile().unwrap().last_location.is_none());
    }

    #[tokio::test]
    async fn frames_from_non_driver_connections_are_dropped() {
        let (state, trip_id, driver_id) = started_trip().await;
        let (_, mut rx) = state.trips.subscribe(trip_id).await.unwrap();
        let frame = r#"{"latitude": 29.65, "longitude": -82.34}"#;

        handle_frame(&state, trip_id, None, frame).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        // The same frame on the driver's connection goes through.
        handle_frame(&state, trip_id, Some(driver_id), frame).await;
        match rx.try_recv().unwrap() {
            LiveEvent::LocationUpdate { latitude, longitude, .. } => {
                assert_eq!(latitude, 29.65);
                assert_eq!(longitude, -82.34);
            }
            other => panic!("expected location update, got {other:?}"),
        }
    }
}
