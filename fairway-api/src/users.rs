use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fairway_core::{DriverProfile, User};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/users", post(register_user))
        .route("/v1/users/{id}", get(get_user))
        .route("/v1/users/{id}/driver", post(attach_driver))
        .route("/v1/auth/phone", post(verify_phone))
}

#[derive(Debug, Deserialize)]
struct RegisterUserRequest {
    name: String,
    email: String,
    phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterUserResponse {
    user_id: Uuid,
    wallet_id: Uuid,
}

async fn register_user(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisterUserResponse>), AppError> {
    if req.name.trim().is_empty() || !req.email.contains('@') {
        return Err(AppError::ValidationError(
            "name and a valid email are required".into(),
        ));
    }

    let user = User::new(req.name, req.email.clone(), req.phone_number);
    let user_id = state.directory.insert_user(user).await;
    // A wallet collision on a freshly minted user id is an invariant
    // breach, not a caller error.
    let wallet = state
        .ledger
        .create_wallet(user_id)
        .await
        .map_err(|err| AppError::InternalServerError(anyhow::anyhow!(err)))?;

    // Delivery failures are logged, never surfaced: the account exists
    // either way and the code can be re-requested.
    let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
    if let Err(err) = state.verification.send_code(&req.email, &code).await {
        tracing::warn!(email = %req.email, %err, "verification code delivery failed");
    }

    Ok((
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            user_id,
            wallet_id: wallet.id,
        }),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.directory.user(id).await?))
}

#[derive(Debug, Deserialize)]
struct AttachDriverRequest {
    license_number: String,
}

async fn attach_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AttachDriverRequest>,
) -> Result<Json<User>, AppError> {
    if req.license_number.trim().is_empty() {
        return Err(AppError::ValidationError("license number is required".into()));
    }

    let entry = state.directory.user_entry(id).await?;
    let mut user = entry.lock().await;
    if !user.attach_driver(DriverProfile::new(req.license_number)) {
        return Err(AppError::ConflictError(
            "user already has a driver role".into(),
        ));
    }
    tracing::info!(user_id = %id, "driver role attached");
    Ok(Json(user.clone()))
}

#[derive(Debug, Deserialize)]
struct VerifyPhoneRequest {
    user_id: Uuid,
    token: String,
}

#[derive(Debug, Serialize)]
struct VerifyPhoneResponse {
    phone_number: String,
}

/// Exchange an external phone-auth token for a verified number and pin it
/// to the user.
async fn verify_phone(
    State(state): State<AppState>,
    Json(req): Json<VerifyPhoneRequest>,
) -> Result<Json<VerifyPhoneResponse>, AppError> {
    let number = state
        .phone_auth
        .authenticate(&req.token)
        .await
        .map_err(|err| AppError::ValidationError(format!("phone token rejected: {err}")))?;

    let entry = state.directory.user_entry(req.user_id).await?;
    {
        let mut user = entry.lock().await;
        user.phone_number = Some(number.clone());
        user.is_phone_verified = true;
    }

    Ok(Json(VerifyPhoneResponse {
        phone_number: number,
    }))
}
