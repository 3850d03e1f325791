use crate::models::{Payment, PaymentDirection, PaymentStatus, Wallet};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("wallet {0} not found")]
    WalletNotFound(Uuid),

    #[error("payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("insufficient balance: have {balance}, need {required}")]
    InsufficientBalance {
        balance: Decimal,
        required: Decimal,
    },

    #[error("invalid payment state: {0}")]
    InvalidState(String),
}

/// Balance projection plus the payment log that backs it, guarded by one
/// mutex so both always commit together.
struct WalletAccount {
    wallet: Wallet,
    payments: Vec<Payment>,
}

/// Owns every wallet and its append-only payment log. All mutation is
/// serialized per wallet; readers get a consistent snapshot, never a
/// half-applied update.
pub struct LedgerEngine {
    accounts: RwLock<HashMap<Uuid, Arc<Mutex<WalletAccount>>>>,
    owners: RwLock<HashMap<Uuid, Uuid>>,
    payment_index: RwLock<HashMap<Uuid, Uuid>>,
    max_topup: Decimal,
}

impl LedgerEngine {
    pub fn new(max_topup: Decimal) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            owners: RwLock::new(HashMap::new()),
            payment_index: RwLock::new(HashMap::new()),
            max_topup,
        }
    }

    /// Create the 1:1 wallet for a user. Called once, at user creation.
    pub async fn create_wallet(&self, owner_id: Uuid) -> Result<Wallet, LedgerError> {
        let mut owners = self.owners.write().await;
        if owners.contains_key(&owner_id) {
            return Err(LedgerError::Validation(format!(
                "user {owner_id} already has a wallet"
            )));
        }

        let wallet = Wallet::new(owner_id);
        owners.insert(owner_id, wallet.id);
        self.accounts.write().await.insert(
            wallet.id,
            Arc::new(Mutex::new(WalletAccount {
                wallet: wallet.clone(),
                payments: Vec::new(),
            })),
        );
        tracing::info!(wallet_id = %wallet.id, owner_id = %owner_id, "wallet created");
        Ok(wallet)
    }

    pub async fn wallet(&self, wallet_id: Uuid) -> Result<Wallet, LedgerError> {
        let account = self.account(wallet_id).await?;
        let guard = account.lock().await;
        Ok(guard.wallet.clone())
    }

    pub async fn wallet_id_for_owner(&self, owner_id: Uuid) -> Result<Uuid, LedgerError> {
        self.owners
            .read()
            .await
            .get(&owner_id)
            .copied()
            .ok_or(LedgerError::WalletNotFound(owner_id))
    }

    /// The wallet's payment log in append order.
    pub async fn payments(&self, wallet_id: Uuid) -> Result<Vec<Payment>, LedgerError> {
        let account = self.account(wallet_id).await?;
        let guard = account.lock().await;
        Ok(guard.payments.clone())
    }

    /// Credit a wallet. Rejects non-positive amounts and amounts above the
    /// configured single top-up cap.
    pub async fn add_funds(&self, wallet_id: Uuid, amount: Decimal) -> Result<Wallet, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "top-up amount must be positive".into(),
            ));
        }
        if amount > self.max_topup {
            return Err(LedgerError::Validation(format!(
                "top-up amount {amount} exceeds the {} cap",
                self.max_topup
            )));
        }

        let account = self.account(wallet_id).await?;
        let mut guard = account.lock().await;

        let payment = Payment::completed(wallet_id, PaymentDirection::Add, amount, None);
        guard.wallet.balance += amount;
        guard.wallet.updated_at = payment.created_at;
        self.payment_index
            .write()
            .await
            .insert(payment.id, wallet_id);
        guard.payments.push(payment);

        tracing::info!(wallet_id = %wallet_id, %amount, balance = %guard.wallet.balance, "funds added");
        Ok(guard.wallet.clone())
    }

    /// Debit a wallet. Fails without any mutation when the balance does
    /// not cover the amount.
    pub async fn deduct_funds(
        &self,
        wallet_id: Uuid,
        amount: Decimal,
        trip_id: Option<Uuid>,
    ) -> Result<Payment, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "deduction amount must be positive".into(),
            ));
        }

        let account = self.account(wallet_id).await?;
        let mut guard = account.lock().await;

        if guard.wallet.balance < amount {
            return Err(LedgerError::InsufficientBalance {
                balance: guard.wallet.balance,
                required: amount,
            });
        }

        let payment = Payment::completed(wallet_id, PaymentDirection::Deduct, amount, trip_id);
        guard.wallet.balance -= amount;
        guard.wallet.updated_at = payment.created_at;
        self.payment_index
            .write()
            .await
            .insert(payment.id, wallet_id);
        guard.payments.push(payment.clone());

        tracing::info!(wallet_id = %wallet_id, %amount, balance = %guard.wallet.balance, "funds deducted");
        Ok(payment)
    }

    /// Reverse a completed deduction: credits the wallet and appends a new
    /// ADD payment linked to the same trip. The original row is back-linked
    /// so a second refund of the same payment fails.
    pub async fn refund(&self, payment_id: Uuid) -> Result<Payment, LedgerError> {
        let wallet_id = self
            .payment_index
            .read()
            .await
            .get(&payment_id)
            .copied()
            .ok_or(LedgerError::PaymentNotFound(payment_id))?;

        let account = self.account(wallet_id).await?;
        let mut guard = account.lock().await;

        let original = guard
            .payments
            .iter()
            .find(|p| p.id == payment_id)
            .ok_or(LedgerError::PaymentNotFound(payment_id))?;

        if original.direction != PaymentDirection::Deduct
            || original.status != PaymentStatus::Completed
        {
            return Err(LedgerError::InvalidState(
                "only completed deductions are refundable".into(),
            ));
        }
        if original.refunded_by.is_some() {
            return Err(LedgerError::InvalidState("payment already refunded".into()));
        }

        let mut refund = Payment::completed(
            wallet_id,
            PaymentDirection::Add,
            original.amount,
            original.trip_id,
        );
        refund.refund_of = Some(payment_id);

        guard.wallet.balance += refund.amount;
        guard.wallet.updated_at = refund.created_at;
        let refund_id = refund.id;
        self.payment_index.write().await.insert(refund_id, wallet_id);
        guard.payments.push(refund.clone());
        if let Some(original) = guard.payments.iter_mut().find(|p| p.id == payment_id) {
            original.refunded_by = Some(refund_id);
        }

        tracing::info!(wallet_id = %wallet_id, payment_id = %payment_id, refund_id = %refund_id, "payment refunded");
        Ok(refund)
    }

    async fn account(&self, wallet_id: Uuid) -> Result<Arc<Mutex<WalletAccount>>, LedgerError> {
        self.accounts
            .read()
            .await
            .get(&wallet_id)
            .cloned()
            .ok_or(LedgerError::WalletNotFound(wallet_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::replayed_balance;
    use rust_decimal_macros::dec;

    async fn engine_with_wallet() -> (LedgerEngine, Uuid) {
        let engine = LedgerEngine::new(dec!(500.00));
        let wallet = engine.create_wallet(Uuid::new_v4()).await.unwrap();
        (engine, wallet.id)
    }

    #[tokio::test]
    async fn add_then_deduct_keeps_projection_in_sync() {
        let (engine, wallet_id) = engine_with_wallet().await;

        engine.add_funds(wallet_id, dec!(30.00)).await.unwrap();
        engine
            .deduct_funds(wallet_id, dec!(12.50), None)
            .await
            .unwrap();

        let wallet = engine.wallet(wallet_id).await.unwrap();
        let payments = engine.payments(wallet_id).await.unwrap();
        assert_eq!(wallet.balance, dec!(17.50));
        assert_eq!(wallet.balance, replayed_balance(&payments));
    }

    #[tokio::test]
    async fn deduct_never_goes_negative() {
        let (engine, wallet_id) = engine_with_wallet().await;
        engine.add_funds(wallet_id, dec!(5.00)).await.unwrap();

        let err = engine
            .deduct_funds(wallet_id, dec!(5.01), None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        // Failed deduction leaves no trace: balance and log untouched.
        let wallet = engine.wallet(wallet_id).await.unwrap();
        assert_eq!(wallet.balance, dec!(5.00));
        assert_eq!(engine.payments(wallet_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rejects_bad_amounts_and_cap_breaches() {
        let (engine, wallet_id) = engine_with_wallet().await;

        assert!(matches!(
            engine.add_funds(wallet_id, dec!(0)).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            engine.add_funds(wallet_id, dec!(-1.00)).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            engine.add_funds(wallet_id, dec!(500.01)).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            engine.deduct_funds(wallet_id, dec!(0), None).await,
            Err(LedgerError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn refund_restores_balance_and_rejects_double_refund() {
        let (engine, wallet_id) = engine_with_wallet().await;
        engine.add_funds(wallet_id, dec!(20.00)).await.unwrap();
        let deduction = engine
            .deduct_funds(wallet_id, dec!(20.00), Some(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(engine.wallet(wallet_id).await.unwrap().balance, dec!(0.00));

        let refund = engine.refund(deduction.id).await.unwrap();
        assert_eq!(refund.refund_of, Some(deduction.id));
        assert_eq!(refund.trip_id, deduction.trip_id);
        assert_eq!(engine.wallet(wallet_id).await.unwrap().balance, dec!(20.00));

        let err = engine.refund(deduction.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState(_)));
        assert_eq!(engine.wallet(wallet_id).await.unwrap().balance, dec!(20.00));
    }

    #[tokio::test]
    async fn refund_requires_a_deduction() {
        let (engine, wallet_id) = engine_with_wallet().await;
        engine.add_funds(wallet_id, dec!(10.00)).await.unwrap();

        let topup = engine.payments(wallet_id).await.unwrap()[0].clone();
        assert!(matches!(
            engine.refund(topup.id).await,
            Err(LedgerError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn one_wallet_per_owner() {
        let engine = LedgerEngine::new(dec!(500.00));
        let owner = Uuid::new_v4();
        engine.create_wallet(owner).await.unwrap();
        assert!(matches!(
            engine.create_wallet(owner).await,
            Err(LedgerError::Validation(_))
        ));
    }
}
