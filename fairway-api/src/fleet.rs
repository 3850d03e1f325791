use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fairway_core::{CartStatus, CartType, GolfCart, Route};
use fairway_shared::geo::GeoPoint;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/carts", post(register_cart))
        .route("/v1/carts/{id}", get(get_cart))
        .route("/v1/carts/{id}/status", post(update_cart_status))
        .route("/v1/routes", post(register_route))
        .route("/v1/routes/{id}", get(get_route))
}

#[derive(Debug, Deserialize)]
struct RegisterCartRequest {
    cart_type: CartType,
    capacity: u8,
}

async fn register_cart(
    State(state): State<AppState>,
    Json(req): Json<RegisterCartRequest>,
) -> Result<(StatusCode, Json<GolfCart>), AppError> {
    if req.capacity == 0 {
        return Err(AppError::ValidationError(
            "cart capacity must be positive".into(),
        ));
    }
    let cart = GolfCart::new(req.cart_type, req.capacity);
    state.directory.insert_cart(cart.clone()).await;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn get_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GolfCart>, AppError> {
    Ok(Json(state.directory.cart(id).await?))
}

#[derive(Debug, Deserialize)]
struct UpdateCartStatusRequest {
    status: CartStatus,
}

/// Pull a cart out of service (or bring it back). A cart mid-trip cannot
/// change status until the trip releases it.
async fn update_cart_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCartStatusRequest>,
) -> Result<Json<GolfCart>, AppError> {
    let entry = state.directory.cart_entry(id).await?;
    let mut cart = entry.lock().await;
    if cart.active_trip.is_some() && req.status != CartStatus::Active {
        return Err(AppError::ConflictError(format!(
            "cart {id} has an active trip"
        )));
    }
    cart.set_status(req.status);
    tracing::info!(cart_id = %id, status = ?req.status, "cart status changed");
    Ok(Json(cart.clone()))
}

#[derive(Debug, Deserialize)]
struct RegisterRouteRequest {
    name: String,
    pickup: GeoPoint,
    dropoff: GeoPoint,
    distance_km: Decimal,
}

async fn register_route(
    State(state): State<AppState>,
    Json(req): Json<RegisterRouteRequest>,
) -> Result<(StatusCode, Json<Route>), AppError> {
    if req.distance_km <= Decimal::ZERO {
        return Err(AppError::ValidationError(
            "route distance must be positive".into(),
        ));
    }
    let route = Route::new(req.name, req.pickup, req.dropoff, req.distance_km);
    state.directory.insert_route(route.clone()).await;
    Ok((StatusCode::CREATED, Json(route)))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Route>, AppError> {
    Ok(Json(state.directory.route(id).await?))
}
