//! CSV deserialization of transaction submissions.
//!
//! Parsing happens in two stages:
//! 1. Serde deserializes each CSV row into a flat `CsvSubmission`.
//! 2. `TryFrom<CsvSubmission>` converts it into a domain `AdmissionRequest`.
//!
//! Malformed rows or missing required fields are logged and skipped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{AdmissionRequest, TransactionKind};

/// Flat representation of a single CSV row. `amount` and `currency` are
/// optional at this stage so a missing field skips only the offending row
/// instead of failing the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CsvSubmission {
    tx: String,
    r#type: TransactionKind,
    amount: Option<Decimal>,
    currency: Option<String>,
}

/// Returns an iterator that lazily deserializes CSV rows into admission
/// requests, skipping any rows that fail to parse or convert.
pub fn deserialize_csv<D: std::io::Read>(
    reader: &mut csv::Reader<D>,
) -> impl Iterator<Item = AdmissionRequest> {
    let submission_iter = reader.deserialize::<CsvSubmission>();

    submission_iter
        .filter_map(|result| match result {
            Ok(submission) => Some(submission),
            Err(e) => {
                // skipping malformed row and logging the error
                warn!("Failed to parse submission: {e}");
                None
            }
        })
        .filter_map(|csv_submission| match AdmissionRequest::try_from(csv_submission) {
            Ok(request) => Some(request),
            Err(e) => {
                // skipping row that failed to convert and logging the error
                warn!("Failed to convert CsvSubmission to AdmissionRequest: {e}");
                None
            }
        })
}

#[derive(Debug, thiserror::Error)]
enum IntoRequestError {
    #[error("Missing amount")]
    MissingAmount,
    #[error("Missing currency")]
    MissingCurrency,
}

impl TryFrom<CsvSubmission> for AdmissionRequest {
    type Error = IntoRequestError;

    fn try_from(value: CsvSubmission) -> Result<Self, Self::Error> {
        Ok(AdmissionRequest::new(
            value.tx,
            value.r#type,
            value.amount.ok_or(IntoRequestError::MissingAmount)?,
            value.currency.ok_or(IntoRequestError::MissingCurrency)?,
        ))
    }
}
