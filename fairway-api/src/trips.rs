use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use fairway_trip::Trip;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", post(create_trip))
        .route("/v1/trips/{id}", get(get_trip))
        .route("/v1/trips/{id}/accept", post(accept_trip))
        .route("/v1/trips/{id}/start", post(start_trip))
        .route("/v1/trips/{id}/complete", post(complete_trip))
        .route("/v1/trips/{id}/cancel", post(cancel_trip))
        .route("/v1/trips/{id}/rate", post(rate_trip))
}

#[derive(Debug, Deserialize)]
struct CreateTripRequest {
    customer_id: Uuid,
    route_id: Uuid,
    seats: u8,
}

async fn create_trip(
    State(state): State<AppState>,
    Json(req): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let trip = state
        .trips
        .create(req.customer_id, req.route_id, req.seats)
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.get(id).await?))
}

#[derive(Debug, Deserialize)]
struct AcceptTripRequest {
    driver_id: Uuid,
    cart_id: Uuid,
}

async fn accept_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AcceptTripRequest>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(
        state.trips.accept(id, req.driver_id, req.cart_id).await?,
    ))
}

async fn start_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.start(id).await?))
}

#[derive(Debug, Deserialize)]
struct CompleteTripRequest {
    end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct CompleteTripResponse {
    fare: Decimal,
    trip: Trip,
}

async fn complete_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteTripRequest>,
) -> Result<Json<CompleteTripResponse>, AppError> {
    let end_time = req.end_time.unwrap_or_else(Utc::now);
    let trip = state.trips.complete(id, end_time).await?;
    Ok(Json(CompleteTripResponse {
        fare: trip.fare,
        trip,
    }))
}

async fn cancel_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.cancel(id).await?))
}

#[derive(Debug, Deserialize)]
struct RateTripRequest {
    rating: f64,
}

async fn rate_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RateTripRequest>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.trips.rate(id, req.rating).await?))
}
