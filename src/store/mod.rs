//! Ledger store interface: a durable, append-only record of transaction
//! entries with atomic transaction scopes.
//!
//! The engine only ever talks to these traits. A relational backend would map
//! them onto real transactions, a unique index on the external id, and an
//! advisory lock; [`memory::InMemoryLedger`] provides the same primitives in
//! process for tests and the replay binary.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{EntryDraft, ExternalId, TransactionEntry};

pub mod memory;

pub use memory::InMemoryLedger;

/// Serialization key for the single balance aggregate. One constant key
/// totally orders every check-then-append sequence; a multi-account variant
/// would derive the key per account instead.
pub const BALANCE_LOCK_KEY: &str = "wallet:balance";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The uniqueness constraint on the external id fired. Enforced by the
    /// store independently of application logic, as the backstop behind the
    /// engine's own idempotency checks.
    #[error("duplicate external id: {0}")]
    DuplicateKey(ExternalId),
    #[error("ledger store unavailable: {0}")]
    Unavailable(String),
}

/// Handle to the durable ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    type Txn: LedgerTxn;

    /// Opens an atomic transaction scope. Work performed through the scope
    /// becomes visible to other scopes only at [`LedgerTxn::commit`].
    async fn begin(&self) -> Result<Self::Txn, StoreError>;
}

/// One open transaction scope. Dropping a scope without committing aborts it.
#[async_trait]
pub trait LedgerTxn: Send {
    async fn find_by_external_id(
        &mut self,
        id: &ExternalId,
    ) -> Result<Option<TransactionEntry>, StoreError>;

    /// Current balance: `sum(signed_amount)` over all visible entries, zero
    /// if there are none.
    async fn sum_signed_amounts(&mut self) -> Result<Decimal, StoreError>;

    /// Stages a new entry and assigns `created_at`. The uniqueness constraint
    /// may fire here or at commit.
    async fn append_entry(&mut self, draft: EntryDraft) -> Result<TransactionEntry, StoreError>;

    /// Blocks until no other open scope holds `key`. The lock lives for the
    /// rest of this scope and is released at commit or abort, never later.
    async fn acquire_serialization(&mut self, key: &str) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn abort(self) -> Result<(), StoreError>;
}
