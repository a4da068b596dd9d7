//! Serializes admission receipts to CSV.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{ExternalId, TransactionKind, TransactionReceipt};

/// Maps directly to the output columns. `created_at` is deliberately omitted
/// so the output stays deterministic.
#[derive(Debug, Serialize)]
struct OutputCsv {
    tx: ExternalId,
    r#type: TransactionKind,
    amount: Decimal,
    currency: String,
    converted_amount: Decimal,
    rate_applied: Decimal,
    balance: Decimal,
}

pub fn print_receipts(
    receipts: &[TransactionReceipt],
    writer: impl std::io::Write,
) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for receipt in receipts {
        let output_csv = OutputCsv {
            tx: receipt.external_id.clone(),
            r#type: receipt.kind,
            amount: receipt.amount,
            currency: receipt.currency.clone(),
            converted_amount: receipt.converted_amount,
            rate_applied: receipt.rate_applied,
            balance: receipt.balance,
        };
        wtr.serialize(output_csv)?;
    }
    wtr.flush()?;
    Ok(())
}
