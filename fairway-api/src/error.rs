use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fairway_ledger::LedgerError;
use fairway_store::DirectoryError;
use fairway_trip::TripError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InvalidStateError(String),
    InsufficientBalanceError(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidStateError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InsufficientBalanceError(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::InternalServerError(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(_) => AppError::ValidationError(err.to_string()),
            LedgerError::WalletNotFound(_) | LedgerError::PaymentNotFound(_) => {
                AppError::NotFoundError(err.to_string())
            }
            LedgerError::InsufficientBalance { .. } => {
                AppError::InsufficientBalanceError(err.to_string())
            }
            LedgerError::InvalidState(_) => AppError::InvalidStateError(err.to_string()),
        }
    }
}

impl From<TripError> for AppError {
    fn from(err: TripError) -> Self {
        match err {
            TripError::Validation(_) => AppError::ValidationError(err.to_string()),
            TripError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            TripError::Conflict(_) => AppError::ConflictError(err.to_string()),
            TripError::InvalidState(_) | TripError::InvalidTransition { .. } => {
                AppError::InvalidStateError(err.to_string())
            }
            TripError::Directory(inner) => inner.into(),
            TripError::Ledger(inner) => inner.into(),
        }
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        AppError::NotFoundError(err.to_string())
    }
}
