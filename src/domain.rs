//! Core domain types: submissions, ledger entries, and receipts.

use chrono::{DateTime, Utc};
use derive_more::{Display, From, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Newtype wrapper for the caller-supplied idempotency key. Globally unique
/// across all entries for all time; immutable once an entry is committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into, Display)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExternalId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Whether a submission credits or debits the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    /// Applies the signing convention: deposits stay positive, withdrawals
    /// are negated. Balance = sum of signed amounts, no per-kind branching.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Deposit => amount,
            TransactionKind::Withdrawal => -amount,
        }
    }
}

/// One transaction submission, before any admission checks have run.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionRequest {
    pub external_id: ExternalId,
    pub kind: TransactionKind,
    /// As submitted by the caller, in `currency`. Must be positive.
    pub amount: Decimal,
    pub currency: String,
}

impl AdmissionRequest {
    pub fn new(
        external_id: impl Into<ExternalId>,
        kind: TransactionKind,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            kind,
            amount,
            currency: currency.into(),
        }
    }

    pub fn deposit(
        external_id: impl Into<ExternalId>,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self::new(external_id, TransactionKind::Deposit, amount, currency)
    }

    pub fn withdrawal(
        external_id: impl Into<ExternalId>,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self::new(external_id, TransactionKind::Withdrawal, amount, currency)
    }
}

/// The sole persisted entity: one committed monetary movement.
///
/// Entries are append-only. They are created exactly once by the admission
/// engine inside one atomic store transaction and never updated or deleted;
/// corrections are new entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionEntry {
    pub external_id: ExternalId,
    pub kind: TransactionKind,
    /// Settlement-currency amount: positive for deposits, negative for
    /// withdrawals. Sign always matches `kind`.
    pub signed_amount: Decimal,
    /// As submitted, always positive, in `original_currency`.
    pub original_amount: Decimal,
    pub original_currency: String,
    /// Conversion rate used at admission time. Stored for audit, never
    /// recomputed later.
    pub rate_applied: Decimal,
    /// Assigned by the store at commit.
    pub created_at: DateTime<Utc>,
}

/// An entry as handed to the store, before `created_at` is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub external_id: ExternalId,
    pub kind: TransactionKind,
    pub signed_amount: Decimal,
    pub original_amount: Decimal,
    pub original_currency: String,
    pub rate_applied: Decimal,
}

impl EntryDraft {
    pub fn into_entry(self, created_at: DateTime<Utc>) -> TransactionEntry {
        TransactionEntry {
            external_id: self.external_id,
            kind: self.kind,
            signed_amount: self.signed_amount,
            original_amount: self.original_amount,
            original_currency: self.original_currency,
            rate_applied: self.rate_applied,
            created_at,
        }
    }
}

/// External response shape for one admitted (or replayed) submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionReceipt {
    pub external_id: ExternalId,
    pub kind: TransactionKind,
    /// Original amount and currency pass through unchanged.
    pub amount: Decimal,
    pub currency: String,
    /// The entry's signed settlement amount.
    pub converted_amount: Decimal,
    pub rate_applied: Decimal,
    /// Balance after commit, or the current balance on a duplicate hit.
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TransactionReceipt {
    /// Pure projection: field selection from the entry plus the supplied
    /// balance, no logic.
    pub fn project(entry: &TransactionEntry, balance: Decimal) -> Self {
        Self {
            external_id: entry.external_id.clone(),
            kind: entry.kind,
            amount: entry.original_amount,
            currency: entry.original_currency.clone(),
            converted_amount: entry.signed_amount,
            rate_applied: entry.rate_applied,
            balance,
            created_at: entry.created_at,
        }
    }
}
