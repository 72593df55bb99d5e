use chrono::{DateTime, Duration, Utc};

use crate::errors::CoreError;
use crate::models::rate::{pair_key, RateQuote, RateTable, TrendPoint};
use crate::providers::chain::ProviderChain;
use crate::storage::cache::{TtlCache, TtlPolicy};
use crate::storage::store::KeyValueStore;

/// Length of the trailing historical window shown as a trend, in days.
pub const TREND_WINDOW_DAYS: i64 = 7;

/// Fetches single rates, full rate tables and historical trends through the
/// provider chain, with a TTL cache in front of every request.
///
/// Cache discipline (shared by all three fetch kinds):
/// 1. Self-pairs short-circuit to the identity rate, no network, no cache.
/// 2. A live cached entry is returned without a network call.
/// 3. On a successful fetch the result is written through before returning.
/// 4. On total failure nothing is cached and the error propagates.
pub struct RateService {
    cache: TtlCache,
}

impl RateService {
    pub fn new(policy: TtlPolicy) -> Self {
        Self {
            cache: TtlCache::new(policy),
        }
    }

    /// Latest rate for an ordered (base, quote) pair.
    pub async fn get_rate(
        &self,
        chain: &ProviderChain,
        store: &mut dyn KeyValueStore,
        base: &str,
        quote: &str,
        now: DateTime<Utc>,
    ) -> Result<RateQuote, CoreError> {
        if base.eq_ignore_ascii_case(quote) {
            return Ok(RateQuote::identity(now.date_naive()));
        }

        let key = format!("rate:{}", pair_key(base, quote));
        if let Some(cached) = self.cache.get::<RateQuote>(store, &key, now) {
            return Ok(cached);
        }

        let fetched = chain.latest(base, quote).await?;
        self.cache.put(store, &key, &fetched, now)?;
        Ok(fetched)
    }

    /// Full rate table for one base currency. One request serves many
    /// conversions.
    pub async fn get_table(
        &self,
        chain: &ProviderChain,
        store: &mut dyn KeyValueStore,
        base: &str,
        now: DateTime<Utc>,
    ) -> Result<RateTable, CoreError> {
        let key = format!("table:{}", base.to_uppercase());
        if let Some(cached) = self.cache.get::<RateTable>(store, &key, now) {
            return Ok(cached);
        }

        let fetched = chain.table(base).await?;
        self.cache.put(store, &key, &fetched, now)?;
        Ok(fetched)
    }

    /// Trailing 7-day trend for a pair, ascending by date.
    pub async fn get_trend(
        &self,
        chain: &ProviderChain,
        store: &mut dyn KeyValueStore,
        base: &str,
        quote: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        let today = now.date_naive();
        let start = today - Duration::days(TREND_WINDOW_DAYS);

        if base.eq_ignore_ascii_case(quote) {
            // Flat identity series, no network.
            let mut points = Vec::new();
            let mut d = start;
            while d <= today {
                points.push(TrendPoint { date: d, value: 1.0 });
                match d.succ_opt() {
                    Some(next) => d = next,
                    None => break,
                }
            }
            return Ok(points);
        }

        let key = format!("trend:{}", pair_key(base, quote));
        if let Some(cached) = self.cache.get::<Vec<TrendPoint>>(store, &key, now) {
            return Ok(cached);
        }

        let points = chain.time_series(base, quote, start, today).await?;
        self.cache.put(store, &key, &points, now)?;
        Ok(points)
    }
}
