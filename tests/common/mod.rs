use std::sync::Arc;

use wallet_ledger::{engine::AdmissionEngine, rates::RateTable, store::InMemoryLedger};

#[allow(dead_code)]
pub type Engine = AdmissionEngine<InMemoryLedger>;

/// Engine over a fresh in-memory ledger, plus a second handle to the same
/// ledger for inspecting what was committed.
pub fn engine() -> (Arc<Engine>, InMemoryLedger) {
    let ledger = InMemoryLedger::new();
    let engine = Arc::new(AdmissionEngine::new(ledger.clone(), RateTable::default()));
    (engine, ledger)
}
