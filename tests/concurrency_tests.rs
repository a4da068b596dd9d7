mod common;

use std::sync::Arc;

use common::{Engine, engine};
use rust_decimal::{Decimal, dec};
use wallet_ledger::{
    domain::{AdmissionRequest, TransactionReceipt},
    engine::AdmissionError,
};

async fn admit_all(
    engine: &Arc<Engine>,
    requests: Vec<AdmissionRequest>,
) -> Vec<Result<TransactionReceipt, AdmissionError>> {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let engine = Arc::clone(engine);
            tokio::spawn(async move { engine.admit(request).await })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("admission task must not panic"));
    }
    outcomes
}

/// Ten concurrent withdrawals of 100 EGP against a 1000 EGP balance: all
/// succeed and the balance lands exactly on zero.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_withdrawals_drain_the_balance_exactly() {
    let (engine, ledger) = engine();

    engine
        .admit(AdmissionRequest::deposit("d1", dec!(1000), "EGP"))
        .await
        .expect("deposit must be admitted");

    let withdrawals = (0..10)
        .map(|i| AdmissionRequest::withdrawal(format!("w{i}"), dec!(100), "EGP"))
        .collect();
    let outcomes = admit_all(&engine, withdrawals).await;

    assert!(outcomes.iter().all(Result::is_ok));
    assert_eq!(ledger.balance(), dec!(0));
    assert_eq!(ledger.entries().len(), 11);
}

/// Two concurrent withdrawals of 150 EGP against a 200 EGP balance: exactly
/// one succeeds with a remaining balance of 50, the other is rejected. Never
/// both, never neither.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn conflicting_withdrawals_are_serialized() {
    let (engine, ledger) = engine();

    engine
        .admit(AdmissionRequest::deposit("d1", dec!(200), "EGP"))
        .await
        .expect("deposit must be admitted");

    let outcomes = admit_all(
        &engine,
        vec![
            AdmissionRequest::withdrawal("w1", dec!(150), "EGP"),
            AdmissionRequest::withdrawal("w2", dec!(150), "EGP"),
        ],
    )
    .await;

    let successes: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
    let failures: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().err()).collect();

    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].balance, dec!(50));
    assert_eq!(failures, vec![&AdmissionError::InsufficientFunds]);
    assert_eq!(ledger.balance(), dec!(50));
    assert_eq!(ledger.entries().len(), 2);
}

/// N concurrent submissions of the same external id collapse into a single
/// stored entry, and every caller observes the same outcome.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resubmissions_collapse_into_one_entry() {
    let (engine, ledger) = engine();

    let duplicates = (0..8)
        .map(|_| AdmissionRequest::deposit("d1", dec!(100), "USD"))
        .collect();
    let outcomes = admit_all(&engine, duplicates).await;

    let receipts: Vec<_> = outcomes
        .into_iter()
        .map(|o| o.expect("every duplicate caller must succeed"))
        .collect();
    assert!(receipts.iter().all(|r| r == &receipts[0]));

    assert_eq!(ledger.entries().len(), 1);
    assert_eq!(ledger.balance(), dec!(3100));
}

/// Conservation under contention: whatever subset of admissions commits, the
/// final balance equals the sum of the committed signed amounts and never
/// goes negative.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn balance_is_conserved_under_mixed_contention() {
    let (engine, ledger) = engine();

    let mut requests: Vec<_> = (0..5)
        .map(|i| AdmissionRequest::deposit(format!("d{i}"), dec!(100), "EGP"))
        .collect();
    requests.extend((0..5).map(|i| AdmissionRequest::withdrawal(format!("w{i}"), dec!(150), "EGP")));

    let outcomes = admit_all(&engine, requests).await;

    let admitted: Decimal = outcomes
        .iter()
        .filter_map(|o| o.as_ref().ok())
        .map(|receipt| receipt.converted_amount)
        .sum();
    let stored: Decimal = ledger
        .entries()
        .iter()
        .map(|entry| entry.signed_amount)
        .sum();

    assert_eq!(ledger.balance(), admitted);
    assert_eq!(ledger.balance(), stored);
    assert!(ledger.balance() >= dec!(0));
}
