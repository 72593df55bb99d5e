use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::rate::{RateQuote, RateTable, TrendPoint};

/// Trait abstraction for all exchange-rate providers.
///
/// Each API provider (Frankfurter, open.er-api.com) implements this trait.
/// If an API stops working or changes, we replace only that one
/// implementation; the chain and service code are untouched.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RateProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Whether this provider can quote the given currency code.
    /// Drives per-currency routing: a pair with an unsupported code never
    /// reaches this provider.
    fn supports(&self, code: &str) -> bool;

    /// Whether this provider serves historical time series at all.
    fn supports_time_series(&self) -> bool;

    /// Enumerate supported currencies with display names.
    async fn currencies(&self) -> Result<Vec<Currency>, CoreError>;

    /// Latest rate for one ordered (base, quote) pair.
    async fn latest(&self, base: &str, quote: &str) -> Result<RateQuote, CoreError>;

    /// Full rate table for a base currency (all supported quotes, one date).
    async fn table(&self, base: &str) -> Result<RateTable, CoreError>;

    /// Historical series for a pair over [from, to], sorted ascending by date.
    async fn time_series(
        &self,
        base: &str,
        quote: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError>;
}
