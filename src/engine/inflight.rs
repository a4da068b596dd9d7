//! Process-local registry of admissions currently in flight.
//!
//! Collapses concurrent submissions sharing an external id into a single
//! underlying admission: the first caller becomes the owner, later concurrent
//! callers join and observe the owner's outcome. Durable idempotency never
//! depends on this map; it only saves redundant store round-trips and
//! duplicate-key races under true concurrency.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::watch;

use crate::domain::{ExternalId, TransactionReceipt};
use crate::engine::errors::AdmissionError;

pub type AdmissionOutcome = Result<TransactionReceipt, AdmissionError>;

type OutcomeSlot = watch::Receiver<Option<AdmissionOutcome>>;

/// Role assigned to a caller for one external id.
pub enum Admission<'a> {
    /// First caller: runs the store path and must publish exactly once.
    Owner(OwnerSlot<'a>),
    /// Concurrent duplicate: awaits the owner's outcome.
    Joiner(OutcomeSlot),
}

#[derive(Debug, Default)]
pub struct InFlightMap {
    slots: Mutex<HashMap<ExternalId, OutcomeSlot>>,
}

impl InFlightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in `id`. The first caller becomes the owner; every
    /// caller arriving while the owner is still working becomes a joiner on
    /// the same slot.
    pub fn begin(&self, id: &ExternalId) -> Admission<'_> {
        let mut slots = self.slots.lock().expect("in-flight map poisoned");
        if let Some(slot) = slots.get(id) {
            return Admission::Joiner(slot.clone());
        }
        let (publish, slot) = watch::channel(None);
        slots.insert(id.clone(), slot);
        Admission::Owner(OwnerSlot {
            map: self,
            id: id.clone(),
            publish,
        })
    }

    /// Waits for the owner of a joined slot to publish its outcome.
    pub async fn join(mut slot: OutcomeSlot) -> AdmissionOutcome {
        match slot.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone().unwrap_or(Err(AdmissionError::Abandoned)),
            // The owner was dropped before publishing anything.
            Err(_) => Err(AdmissionError::Abandoned),
        }
    }

    fn evict(&self, id: &ExternalId) {
        self.slots
            .lock()
            .expect("in-flight map poisoned")
            .remove(id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots.lock().expect("in-flight map poisoned").len()
    }
}

/// Exclusive right, and obligation, to run the admission for one id and
/// publish its outcome. The id is evicted when the slot drops, so even an
/// owner cancelled mid-flight leaves no stale entry behind, and a future
/// resubmission of the same id goes through the durable idempotency path
/// instead of stale memory.
pub struct OwnerSlot<'a> {
    map: &'a InFlightMap,
    id: ExternalId,
    publish: watch::Sender<Option<AdmissionOutcome>>,
}

impl OwnerSlot<'_> {
    /// Publishes the outcome to every joiner, exactly once.
    pub fn complete(self, outcome: AdmissionOutcome) {
        // Send only fails when every joiner is already gone.
        let _ = self.publish.send(Some(outcome));
    }
}

impl Drop for OwnerSlot<'_> {
    fn drop(&mut self) {
        self.map.evict(&self.id);
    }
}
