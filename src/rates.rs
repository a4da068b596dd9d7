//! Fixed-table currency conversion into the settlement currency.

use std::collections::HashMap;

use rust_decimal::{Decimal, dec};

/// The currency all stored amounts are normalized to.
pub const SETTLEMENT_CURRENCY: &str = "EGP";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

/// Immutable conversion table. Built once at startup and shared read-only;
/// codes are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct RateTable(HashMap<String, Decimal>);

impl Default for RateTable {
    fn default() -> Self {
        Self::from_rates([
            ("USD", dec!(31.0)),
            ("EUR", dec!(33.5)),
            ("GBP", dec!(39.2)),
            (SETTLEMENT_CURRENCY, dec!(1.0)),
        ])
    }
}

impl RateTable {
    pub fn from_rates<'a>(rates: impl IntoIterator<Item = (&'a str, Decimal)>) -> Self {
        Self(
            rates
                .into_iter()
                .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
                .collect(),
        )
    }

    /// Settlement rate for a currency code.
    pub fn rate(&self, code: &str) -> Result<Decimal, RateError> {
        self.0
            .get(&code.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| RateError::UnsupportedCurrency(code.to_owned()))
    }

    /// Converts an amount into the settlement currency: `amount * rate(code)`.
    pub fn convert(&self, amount: Decimal, code: &str) -> Result<Decimal, RateError> {
        Ok(amount * self.rate(code)?)
    }
}
