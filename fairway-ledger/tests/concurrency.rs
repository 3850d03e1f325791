use fairway_ledger::models::replayed_balance;
use fairway_ledger::{LedgerEngine, LedgerError};
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn concurrent_mutations_keep_balance_consistent() {
    let engine = Arc::new(LedgerEngine::new(dec!(500.00)));
    let wallet = engine.create_wallet(Uuid::new_v4()).await.unwrap();
    engine.add_funds(wallet.id, dec!(100.00)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let engine = engine.clone();
        let wallet_id = wallet.id;
        tasks.push(tokio::spawn(async move {
            engine.add_funds(wallet_id, dec!(2.00)).await.unwrap();
            let _ = engine.deduct_funds(wallet_id, dec!(1.50), None).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let wallet = engine.wallet(wallet.id).await.unwrap();
    let payments = engine.payments(wallet.id).await.unwrap();
    assert_eq!(wallet.balance, replayed_balance(&payments));
    assert_eq!(wallet.balance, dec!(110.00));
}

#[tokio::test]
async fn concurrent_deducts_never_overdraw() {
    let engine = Arc::new(LedgerEngine::new(dec!(500.00)));
    let wallet = engine.create_wallet(Uuid::new_v4()).await.unwrap();
    engine.add_funds(wallet.id, dec!(10.00)).await.unwrap();

    // Ten racers each try to take 4.00 out of 10.00; only two can win.
    let mut tasks = Vec::new();
    for _ in 0..10 {
        let engine = engine.clone();
        let wallet_id = wallet.id;
        tasks.push(tokio::spawn(async move {
            engine.deduct_funds(wallet_id, dec!(4.00), None).await
        }));
    }

    let mut won = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => won += 1,
            Err(LedgerError::InsufficientBalance { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(won, 2);
    let wallet = engine.wallet(wallet.id).await.unwrap();
    assert_eq!(wallet.balance, dec!(2.00));
    assert_eq!(
        wallet.balance,
        replayed_balance(&engine.payments(wallet.id).await.unwrap())
    );
}

#[tokio::test]
async fn payment_log_is_observed_in_append_order() {
    let engine = Arc::new(LedgerEngine::new(dec!(500.00)));
    let wallet = engine.create_wallet(Uuid::new_v4()).await.unwrap();

    for _ in 0..5 {
        engine.add_funds(wallet.id, dec!(1.00)).await.unwrap();
    }

    let payments = engine.payments(wallet.id).await.unwrap();
    let mut stamped: Vec<_> = payments.iter().map(|p| p.created_at).collect();
    stamped.sort();
    assert_eq!(
        stamped,
        payments.iter().map(|p| p.created_at).collect::<Vec<_>>()
    );
}
