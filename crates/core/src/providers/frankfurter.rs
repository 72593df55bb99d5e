use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::RateProvider;
use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::rate::{RateQuote, RateTable, TrendPoint};

const BASE_URL: &str = "https://api.frankfurter.app";

/// Per-call network timeout. A slow provider is treated as a fetch failure
/// and the chain falls back to the next one.
#[cfg(not(target_arch = "wasm32"))]
const TIMEOUT_SECS: u64 = 6;

/// Currency codes Frankfurter (ECB reference rates) can quote. Known up
/// front so pairs outside this set are routed straight to a fallback
/// provider instead of burning a guaranteed-failing request. Notably
/// absent: NGN.
const SYMBOLS: &[&str] = &[
    "AUD", "BGN", "BRL", "CAD", "CHF", "CNY", "CZK", "DKK", "EUR", "GBP", "HKD", "HUF", "IDR",
    "ILS", "INR", "ISK", "JPY", "KRW", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN", "RON", "SEK",
    "SGD", "THB", "TRY", "USD", "ZAR",
];

/// Frankfurter API provider for fiat exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) data.
/// - **Coverage**: ~30 currencies (no NGN).
/// - **Endpoints**: `/currencies`, `/latest`, `/{start}..{end}`
pub struct FrankfurterProvider {
    client: Client,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(TIMEOUT_SECS));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    date: NaiveDate,
    rates: HashMap<String, f64>,
}

#[derive(Deserialize)]
struct TimeSeriesResponse {
    rates: HashMap<String, HashMap<String, f64>>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    fn supports(&self, code: &str) -> bool {
        let upper = code.to_uppercase();
        SYMBOLS.contains(&upper.as_str())
    }

    fn supports_time_series(&self) -> bool {
        true
    }

    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        let url = format!("{BASE_URL}/currencies");

        // Response is a flat { "USD": "United States Dollar", ... } map.
        let resp: HashMap<String, String> = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse currency list: {e}"),
            })?;

        Ok(resp
            .into_iter()
            .map(|(code, name)| Currency { code, name })
            .collect())
    }

    async fn latest(&self, base: &str, quote: &str) -> Result<RateQuote, CoreError> {
        let base = base.to_uppercase();
        let quote = quote.to_uppercase();
        let url = format!("{BASE_URL}/latest?base={base}&symbols={quote}");

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse response for {base}/{quote}: {e}"),
            })?;

        let rate = resp.rates.get(&quote).copied().ok_or_else(|| CoreError::Api {
            provider: "Frankfurter".into(),
            message: format!("No rate found for {base} → {quote}"),
        })?;

        Ok(RateQuote::new(rate, resp.date))
    }

    async fn table(&self, base: &str) -> Result<RateTable, CoreError> {
        let base = base.to_uppercase();
        let url = format!("{BASE_URL}/latest?base={base}");

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse rate table for base {base}: {e}"),
            })?;

        Ok(RateTable {
            as_of: resp.date,
            rates: resp.rates,
        })
    }

    async fn time_series(
        &self,
        base: &str,
        quote: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        let base = base.to_uppercase();
        let quote = quote.to_uppercase();
        let from_str = from.format("%Y-%m-%d");
        let to_str = to.format("%Y-%m-%d");
        let url = format!("{BASE_URL}/{from_str}..{to_str}?base={base}&symbols={quote}");

        let resp: TimeSeriesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse time series for {base}/{quote}: {e}"),
            })?;

        let mut points: Vec<TrendPoint> = resp
            .rates
            .iter()
            .filter_map(|(date_str, rates)| {
                let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
                let value = rates.get(&quote)?;
                Some(TrendPoint {
                    date,
                    value: *value,
                })
            })
            .collect();

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}
