use crate::domain::ExternalId;
use crate::rates::RateError;
use crate::store::StoreError;

/// Terminal outcome classification for one admission.
///
/// `InvalidInput`, `UnsupportedCurrency` and `InsufficientFunds` are
/// client-attributable and non-retryable without changing the request.
/// `DuplicateTransaction` is a conflict, not a fault: it is only reachable
/// when the store's uniqueness constraint fires behind the logical checks,
/// and the original submission already succeeded. `Store` failures are
/// opaque; retries belong to the caller, never to the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdmissionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Insufficient funds")]
    InsufficientFunds,
    #[error("Transaction already committed: {0}")]
    DuplicateTransaction(ExternalId),
    #[error("Ledger store failure: {0}")]
    Store(String),
    #[error("Admission abandoned before a result was published")]
    Abandoned,
}

impl From<RateError> for AdmissionError {
    fn from(error: RateError) -> Self {
        match error {
            RateError::UnsupportedCurrency(code) => AdmissionError::UnsupportedCurrency(code),
        }
    }
}

impl From<StoreError> for AdmissionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateKey(id) => AdmissionError::DuplicateTransaction(id),
            other => AdmissionError::Store(other.to_string()),
        }
    }
}
