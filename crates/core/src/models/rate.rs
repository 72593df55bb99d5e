use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single exchange rate for an ordered (base, quote) pair.
///
/// Invariants: `rate` is finite and strictly positive; a self-pair
/// (base == quote) always carries `rate == 1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub rate: f64,
    pub as_of: NaiveDate,
}

impl RateQuote {
    pub fn new(rate: f64, as_of: NaiveDate) -> Self {
        Self { rate, as_of }
    }

    /// The identity quote for a self-pair, dated today.
    pub fn identity(today: NaiveDate) -> Self {
        Self {
            rate: 1.0,
            as_of: today,
        }
    }
}

/// Full rate table for one base currency as of one date.
/// Used by multi-currency conversion to avoid N single-rate requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub as_of: NaiveDate,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    /// Look up the rate for one quote currency; a self-pair is always 1.
    pub fn rate_for(&self, base: &str, quote: &str) -> Option<f64> {
        if base.eq_ignore_ascii_case(quote) {
            return Some(1.0);
        }
        self.rates.get(&quote.to_uppercase()).copied()
    }
}

/// One point of a historical rate series (date → rate value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cache key for a (base, quote) pair, e.g. "USD->NGN".
/// Both single-rate and trend caches key on this form.
pub fn pair_key(base: &str, quote: &str) -> String {
    format!("{}->{}", base.to_uppercase(), quote.to_uppercase())
}
