use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDirection {
    Add,
    Deduct,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Cached balance projection for one user. The payment log is the source
/// of truth; `balance` must always equal the replayed log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One row in the append-only wallet ledger. Immutable once COMPLETED,
/// except for the `refunded_by` back-link set when a refund lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub trip_id: Option<Uuid>,
    pub amount: Decimal,
    pub direction: PaymentDirection,
    pub status: PaymentStatus,
    pub refund_of: Option<Uuid>,
    pub refunded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// A payment committed in the same unit of work as its balance change.
    /// Ids are v7 so the log sorts by creation time.
    pub fn completed(
        wallet_id: Uuid,
        direction: PaymentDirection,
        amount: Decimal,
        trip_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            wallet_id,
            trip_id,
            amount,
            direction,
            status: PaymentStatus::Completed,
            refund_of: None,
            refunded_by: None,
            created_at: Utc::now(),
        }
    }
}

/// Replay a payment log into the balance it implies. Test code uses this
/// to check the cached projection.
pub fn replayed_balance(payments: &[Payment]) -> Decimal {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .fold(Decimal::ZERO, |acc, p| match p.direction {
            PaymentDirection::Add => acc + p.amount,
            PaymentDirection::Deduct => acc - p.amount,
        })
}
