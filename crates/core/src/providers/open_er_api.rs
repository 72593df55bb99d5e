use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::RateProvider;
use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::rate::{RateQuote, RateTable, TrendPoint};

const BASE_URL: &str = "https://open.er-api.com/v6/latest";

#[cfg(not(target_arch = "wasm32"))]
const TIMEOUT_SECS: u64 = 6;

/// open.er-api.com provider, used as the fallback when Frankfurter fails or
/// does not carry a requested currency (e.g. NGN).
///
/// - **Free**: No API key.
/// - **Coverage**: ~160 currency codes, latest rates only.
/// - **Endpoint**: `/v6/latest/{base}`, returning a full rate table per request.
///
/// Limitations: no historical series and no display-name enumeration, so
/// `supports_time_series()` is false and `currencies()` always errors.
pub struct OpenErApiProvider {
    client: Client,
}

impl OpenErApiProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(TIMEOUT_SECS));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    async fn fetch_table(&self, base: &str) -> Result<RateTable, CoreError> {
        let url = format!("{BASE_URL}/{base}");

        let resp: LatestResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "open.er-api.com".into(),
                message: format!("Failed to parse response for base {base}: {e}"),
            })?;

        if resp.result != "success" {
            return Err(CoreError::Api {
                provider: "open.er-api.com".into(),
                message: format!("Request for base {base} returned result={}", resp.result),
            });
        }

        // The update stamp is RFC 2822 ("Fri, 23 Aug 2024 00:02:31 +0000").
        // If it is missing or malformed, fall back to today's date.
        let as_of = resp
            .time_last_update_utc
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc2822(s).ok())
            .map(|dt| dt.date_naive())
            .unwrap_or_else(|| Utc::now().date_naive());

        Ok(RateTable {
            as_of,
            rates: resp.rates,
        })
    }
}

impl Default for OpenErApiProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── open.er-api.com response types ──────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    result: String,
    time_last_update_utc: Option<String>,
    rates: HashMap<String, f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl RateProvider for OpenErApiProvider {
    fn name(&self) -> &str {
        "open.er-api.com"
    }

    fn supports(&self, code: &str) -> bool {
        // Covers effectively every ISO-4217 code in circulation.
        code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
    }

    fn supports_time_series(&self) -> bool {
        false
    }

    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        Err(CoreError::CurrencyListUnavailable(
            "open.er-api.com does not provide currency display names".into(),
        ))
    }

    async fn latest(&self, base: &str, quote: &str) -> Result<RateQuote, CoreError> {
        let base = base.to_uppercase();
        let quote = quote.to_uppercase();

        // One endpoint only: fetch the full table and pick out the quote.
        let table = self.fetch_table(&base).await?;
        let rate = table.rates.get(&quote).copied().ok_or_else(|| CoreError::Api {
            provider: "open.er-api.com".into(),
            message: format!("No rate found for {base} → {quote}"),
        })?;

        Ok(RateQuote::new(rate, table.as_of))
    }

    async fn table(&self, base: &str) -> Result<RateTable, CoreError> {
        self.fetch_table(&base.to_uppercase()).await
    }

    async fn time_series(
        &self,
        _base: &str,
        quote: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        Err(CoreError::TrendUnsupported {
            currency: quote.to_uppercase(),
        })
    }
}
