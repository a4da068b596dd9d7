mod common;

use common::engine;
use rust_decimal::dec;
use wallet_ledger::{
    domain::{AdmissionRequest, TransactionKind},
    engine::AdmissionError,
};

/// Validation failures never reach the store.
#[tokio::test]
async fn empty_external_id_is_invalid() {
    let (engine, ledger) = engine();

    let error = engine
        .admit(AdmissionRequest::deposit("", dec!(100), "USD"))
        .await
        .expect_err("empty id must be rejected");

    assert!(matches!(error, AdmissionError::InvalidInput(_)));
    assert!(ledger.entries().is_empty());
}

#[tokio::test]
async fn empty_currency_is_invalid() {
    let (engine, ledger) = engine();

    let error = engine
        .admit(AdmissionRequest::deposit("d1", dec!(100), ""))
        .await
        .expect_err("empty currency must be rejected");

    assert!(matches!(error, AdmissionError::InvalidInput(_)));
    assert!(ledger.entries().is_empty());
}

#[tokio::test]
async fn zero_amount_is_invalid() {
    let (engine, ledger) = engine();

    let error = engine
        .admit(AdmissionRequest::deposit("d1", dec!(0), "USD"))
        .await
        .expect_err("zero amount must be rejected");

    assert!(matches!(error, AdmissionError::InvalidInput(_)));
    assert!(ledger.entries().is_empty());
}

#[tokio::test]
async fn negative_amount_is_invalid_for_both_kinds() {
    let (engine, ledger) = engine();

    for kind in [TransactionKind::Deposit, TransactionKind::Withdrawal] {
        let error = engine
            .admit(AdmissionRequest::new("d1", kind, dec!(-5), "USD"))
            .await
            .expect_err("negative amount must be rejected");
        assert!(matches!(error, AdmissionError::InvalidInput(_)));
    }

    assert!(ledger.entries().is_empty());
}
