//! In-memory ledger store.
//!
//! Provides the same primitives a transactional relational store would:
//! atomic scopes with staged writes, a uniqueness constraint on the external
//! id, and advisory locks scoped to the enclosing transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::{EntryDraft, ExternalId, TransactionEntry};
use crate::store::{LedgerStore, LedgerTxn, StoreError};

#[derive(Debug, Default)]
struct Committed {
    entries: Vec<TransactionEntry>,
}

impl Committed {
    fn find(&self, id: &ExternalId) -> Option<&TransactionEntry> {
        self.entries.iter().find(|entry| &entry.external_id == id)
    }

    fn balance(&self) -> Decimal {
        self.entries.iter().map(|entry| entry.signed_amount).sum()
    }
}

/// Shared in-memory ledger. Cloning yields another handle to the same ledger,
/// so tests can keep one handle for inspection while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    committed: Arc<Mutex<Committed>>,
    locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all committed entries, in commit order.
    pub fn entries(&self) -> Vec<TransactionEntry> {
        self.committed
            .lock()
            .expect("ledger state poisoned")
            .entries
            .clone()
    }

    /// Committed balance, read outside any transaction scope.
    pub fn balance(&self) -> Decimal {
        self.committed.lock().expect("ledger state poisoned").balance()
    }

    fn state(&self) -> Result<MutexGuard<'_, Committed>, StoreError> {
        self.committed
            .lock()
            .map_err(|_| StoreError::Unavailable("ledger state poisoned".to_owned()))
    }

    fn lock_handle(&self, key: &str) -> Result<Arc<AsyncMutex<()>>, StoreError> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| StoreError::Unavailable("lock registry poisoned".to_owned()))?;
        Ok(Arc::clone(locks.entry(key.to_owned()).or_default()))
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    type Txn = MemoryTxn;

    async fn begin(&self) -> Result<MemoryTxn, StoreError> {
        Ok(MemoryTxn {
            ledger: self.clone(),
            staged: Vec::new(),
            held: Vec::new(),
        })
    }
}

/// One open scope over the in-memory ledger. Staged entries are invisible to
/// other scopes until commit; dropping the scope discards them and releases
/// any held advisory locks.
pub struct MemoryTxn {
    ledger: InMemoryLedger,
    staged: Vec<TransactionEntry>,
    held: Vec<(String, OwnedMutexGuard<()>)>,
}

#[async_trait]
impl LedgerTxn for MemoryTxn {
    async fn find_by_external_id(
        &mut self,
        id: &ExternalId,
    ) -> Result<Option<TransactionEntry>, StoreError> {
        if let Some(entry) = self.staged.iter().find(|entry| &entry.external_id == id) {
            return Ok(Some(entry.clone()));
        }
        Ok(self.ledger.state()?.find(id).cloned())
    }

    async fn sum_signed_amounts(&mut self) -> Result<Decimal, StoreError> {
        let committed = self.ledger.state()?.balance();
        let staged: Decimal = self.staged.iter().map(|entry| entry.signed_amount).sum();
        Ok(committed + staged)
    }

    async fn append_entry(&mut self, draft: EntryDraft) -> Result<TransactionEntry, StoreError> {
        let already_staged = self
            .staged
            .iter()
            .any(|entry| entry.external_id == draft.external_id);
        if already_staged || self.ledger.state()?.find(&draft.external_id).is_some() {
            return Err(StoreError::DuplicateKey(draft.external_id));
        }
        let entry = draft.into_entry(Utc::now());
        self.staged.push(entry.clone());
        Ok(entry)
    }

    async fn acquire_serialization(&mut self, key: &str) -> Result<(), StoreError> {
        // Re-acquiring a key this scope already holds is a no-op.
        if self.held.iter().any(|(held, _)| held == key) {
            return Ok(());
        }
        let handle = self.ledger.lock_handle(key)?;
        let guard = handle.lock_owned().await;
        self.held.push((key.to_owned(), guard));
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut committed = self.ledger.state()?;
        // The constraint is re-checked at the commit boundary: a racing append
        // that slipped past every logical check is rejected here.
        for entry in &self.staged {
            if committed.find(&entry.external_id).is_some() {
                return Err(StoreError::DuplicateKey(entry.external_id.clone()));
            }
        }
        committed.entries.extend(self.staged);
        Ok(())
        // held guards drop on return, releasing the advisory locks
    }

    async fn abort(self) -> Result<(), StoreError> {
        Ok(())
    }
}
