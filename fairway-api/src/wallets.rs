use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use fairway_ledger::{Payment, Wallet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/wallets/{id}", get(get_wallet))
        .route("/v1/wallets/{id}/payments", get(list_payments))
        .route("/v1/wallets/{id}/funds", post(add_funds))
        .route("/v1/payments/{id}/refund", post(refund_payment))
}

async fn get_wallet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Wallet>, AppError> {
    Ok(Json(state.ledger.wallet(id).await?))
}

async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    Ok(Json(state.ledger.payments(id).await?))
}

#[derive(Debug, Deserialize)]
struct AddFundsRequest {
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct AddFundsResponse {
    new_balance: Decimal,
}

async fn add_funds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddFundsRequest>,
) -> Result<Json<AddFundsResponse>, AppError> {
    let wallet = state.ledger.add_funds(id, req.amount).await?;
    Ok(Json(AddFundsResponse {
        new_balance: wallet.balance,
    }))
}

#[derive(Debug, Serialize)]
struct RefundResponse {
    refund: Payment,
}

async fn refund_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RefundResponse>, AppError> {
    let refund = state.ledger.refund(id).await?;
    Ok(Json(RefundResponse { refund }))
}
