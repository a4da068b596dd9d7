//! Transaction admission engine.
//!
//! Resolves idempotency, enforces the non-negative-balance invariant, and
//! commits new ledger entries. One admission is one call to
//! [`AdmissionEngine::admit`]; many admissions may run concurrently.

use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    domain::{AdmissionRequest, EntryDraft, TransactionKind, TransactionReceipt},
    engine::inflight::{Admission, InFlightMap},
    rates::RateTable,
    store::{BALANCE_LOCK_KEY, LedgerStore, LedgerTxn},
};

pub use errors::AdmissionError;

pub mod errors;
pub mod inflight;

pub struct AdmissionEngine<S> {
    store: S,
    rates: RateTable,
    in_flight: InFlightMap,
}

impl<S: LedgerStore> AdmissionEngine<S> {
    pub fn new(store: S, rates: RateTable) -> Self {
        Self {
            store,
            rates,
            in_flight: InFlightMap::new(),
        }
    }

    /// Admits one transaction submission.
    ///
    /// Exactly one caller per external id runs the store path; callers
    /// arriving while it is in flight receive its outcome verbatim. A
    /// resubmission after the original completed is answered from the
    /// durable record, so the result is the same entry either way.
    pub async fn admit(
        &self,
        request: AdmissionRequest,
    ) -> Result<TransactionReceipt, AdmissionError> {
        validate(&request)?;

        match self.in_flight.begin(&request.external_id) {
            Admission::Joiner(slot) => {
                debug!(id = %request.external_id, "joining in-flight admission");
                InFlightMap::join(slot).await
            }
            Admission::Owner(owner) => {
                let outcome = self.run_owner(&request).await;
                owner.complete(outcome.clone());
                outcome
            }
        }
    }

    /// Owner path: one atomic store transaction around the whole admission.
    /// Any failure aborts the scope, so there are never partial effects.
    async fn run_owner(
        &self,
        request: &AdmissionRequest,
    ) -> Result<TransactionReceipt, AdmissionError> {
        let mut txn = self.store.begin().await?;
        match self.admit_in_txn(&mut txn, request).await {
            Ok(receipt) => {
                txn.commit().await?;
                Ok(receipt)
            }
            Err(error) => {
                // The admission already failed; the abort result is secondary.
                if let Err(abort_error) = txn.abort().await {
                    debug!(%abort_error, "failed to abort ledger transaction");
                }
                Err(error)
            }
        }
    }

    async fn admit_in_txn(
        &self,
        txn: &mut S::Txn,
        request: &AdmissionRequest,
    ) -> Result<TransactionReceipt, AdmissionError> {
        // Durable idempotency: a resubmission is a no-op even when the
        // in-flight map never saw the original. Read-only, so no
        // serialization lock is taken on this path.
        if let Some(existing) = txn.find_by_external_id(&request.external_id).await? {
            let balance = txn.sum_signed_amounts().await?;
            debug!(id = %existing.external_id, "duplicate submission, returning existing entry");
            return Ok(TransactionReceipt::project(&existing, balance));
        }

        let converted = self.rates.convert(request.amount, &request.currency)?;
        let rate = self.rates.rate(&request.currency)?;

        // Total order over every read-balance/decide/append sequence. Held
        // until commit or abort, never past the transaction boundary.
        txn.acquire_serialization(BALANCE_LOCK_KEY).await?;
        let balance = txn.sum_signed_amounts().await?;

        let signed_amount = request.kind.signed(converted);
        if request.kind == TransactionKind::Withdrawal && balance + signed_amount < Decimal::ZERO {
            return Err(AdmissionError::InsufficientFunds);
        }

        let entry = txn
            .append_entry(EntryDraft {
                external_id: request.external_id.clone(),
                kind: request.kind,
                signed_amount,
                original_amount: request.amount,
                original_currency: request.currency.clone(),
                rate_applied: rate,
            })
            .await?;

        // No other writer can have interleaved, so the new balance is
        // arithmetic rather than a second query.
        Ok(TransactionReceipt::project(&entry, balance + signed_amount))
    }
}

/// All validation happens before any store interaction.
fn validate(request: &AdmissionRequest) -> Result<(), AdmissionError> {
    if request.external_id.as_str().trim().is_empty() {
        return Err(AdmissionError::InvalidInput(
            "external id must not be empty".to_owned(),
        ));
    }
    if request.currency.trim().is_empty() {
        return Err(AdmissionError::InvalidInput(
            "currency must not be empty".to_owned(),
        ));
    }
    if request.amount <= Decimal::ZERO {
        return Err(AdmissionError::InvalidInput(
            "amount must be greater than zero".to_owned(),
        ));
    }
    Ok(())
}
