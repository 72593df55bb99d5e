pub mod errors;
pub mod format;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use errors::CoreError;
use models::{
    alert::{Alert, AlertConfig, AlertDirection},
    currency::Currency,
    rate::{pair_key, RateQuote, TrendPoint},
    recent::RecentPairs,
    settings::{Settings, Theme},
};
use providers::chain::ProviderChain;
use services::{
    alert_service::AlertService, conversion, currency_service::CurrencyService,
    rate_service::RateService,
};
use storage::cache::TtlPolicy;
use storage::store::KeyValueStore;

const SETTINGS_KEY: &str = "settings";
const RECENT_PAIRS_KEY: &str = "recent_pairs";

/// Result of applying a completed rate refresh: the quote plus whether the
/// pair's alert fired on this observation.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRefresh {
    pub quote: RateQuote,
    pub alert_fired: bool,
}

/// One row of a multi-currency conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedRow {
    pub code: String,
    pub rate: f64,
    pub value: f64,
}

/// Main entry point for the FX Converter core library.
///
/// Holds the injected store, the provider chain and all services, plus the
/// active pair and the request-generation counter that discards superseded
/// in-flight rate results (the result of an older request is never applied
/// once a newer one has started; the underlying call is not cancelled).
#[must_use]
pub struct FxConverter {
    store: Box<dyn KeyValueStore>,
    chain: ProviderChain,
    currency_service: CurrencyService,
    rate_service: RateService,
    alert_service: AlertService,
    settings: Settings,
    recent: RecentPairs,
    /// Bumped on every pair change; completions carrying an older token
    /// are discarded.
    generation: AtomicU64,
    last_quote: Option<RateQuote>,
    /// When each pair's armed alert last saw a rate check.
    last_alert_check: HashMap<String, DateTime<Utc>>,
}

impl std::fmt::Debug for FxConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxConverter")
            .field("base", &self.settings.base)
            .field("quote", &self.settings.quote)
            .field("theme", &self.settings.theme)
            .field("recent_pairs", &self.recent.len())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

impl FxConverter {
    /// Build a converter over the default Frankfurter → open.er-api.com
    /// provider chain and the default 15-minute TTL policy.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_chain(store, ProviderChain::with_defaults(), TtlPolicy::default())
    }

    /// Build with an explicit chain and TTL policy. Tests inject mock
    /// providers and a short TTL here.
    pub fn with_chain(store: Box<dyn KeyValueStore>, chain: ProviderChain, policy: TtlPolicy) -> Self {
        let settings = load_json(store.as_ref(), SETTINGS_KEY).unwrap_or_default();
        let recent = load_json(store.as_ref(), RECENT_PAIRS_KEY).unwrap_or_default();
        Self {
            store,
            chain,
            currency_service: CurrencyService::new(policy),
            rate_service: RateService::new(policy),
            alert_service: AlertService::new(),
            settings,
            recent,
            generation: AtomicU64::new(0),
            last_quote: None,
            last_alert_check: HashMap::new(),
        }
    }

    // ── Pair & settings ─────────────────────────────────────────────

    pub fn base(&self) -> &str {
        &self.settings.base
    }

    pub fn quote(&self) -> &str {
        &self.settings.quote
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), CoreError> {
        self.settings.theme = theme;
        self.persist_settings()
    }

    /// Switch the active pair. Records the pair in the recent list (unless it
    /// is a self-pair), invalidates any in-flight rate request, and clears
    /// the displayed quote.
    pub fn set_pair(&mut self, base: &str, quote: &str) -> Result<(), CoreError> {
        let base = base.trim().to_uppercase();
        let quote = quote.trim().to_uppercase();
        if base.is_empty() || quote.is_empty() {
            return Err(CoreError::ValidationError(
                "Currency codes must be non-empty".into(),
            ));
        }
        if base == self.settings.base && quote == self.settings.quote {
            return Ok(());
        }

        self.settings.base = base.clone();
        self.settings.quote = quote.clone();
        self.persist_settings()?;

        self.recent.record(&base, &quote);
        self.persist_recent()?;

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.last_quote = None;
        Ok(())
    }

    /// Swap base and quote.
    pub fn swap(&mut self) -> Result<(), CoreError> {
        let base = self.settings.quote.clone();
        let quote = self.settings.base.clone();
        self.set_pair(&base, &quote)
    }

    pub fn recent_pairs(&self) -> &[String] {
        self.recent.as_slice()
    }

    // ── Currencies ──────────────────────────────────────────────────

    /// Supported currencies, served from cache when live. Degrades to the
    /// built-in list on failure, never errors.
    pub async fn currencies(&mut self, now: DateTime<Utc>) -> Vec<Currency> {
        self.currency_service
            .load(&self.chain, self.store.as_mut(), now)
            .await
    }

    /// Manual reload of the currency list, bypassing the cache.
    pub async fn reload_currencies(&mut self, now: DateTime<Utc>) -> Vec<Currency> {
        self.currency_service
            .reload(&self.chain, self.store.as_mut(), now)
            .await
    }

    // ── Rates & conversion ──────────────────────────────────────────

    /// Token identifying the rate request about to start. A completion is
    /// applied only while its token is still current.
    pub fn begin_rate_request(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fetch the latest rate for the active pair and apply it, unless the
    /// pair changed while the fetch was in flight (then `Ok(None)`).
    pub async fn refresh_rate(&mut self, now: DateTime<Utc>) -> Result<Option<RateRefresh>, CoreError> {
        let token = self.begin_rate_request();
        let base = self.settings.base.clone();
        let quote = self.settings.quote.clone();
        let fetched = self
            .rate_service
            .get_rate(&self.chain, self.store.as_mut(), &base, &quote, now)
            .await?;
        self.apply_rate(token, fetched, now)
    }

    /// Apply a completed rate fetch. Discards the result when `token` is
    /// stale; otherwise stores the quote and feeds it to the pair's alert.
    pub fn apply_rate(
        &mut self,
        token: u64,
        fetched: RateQuote,
        now: DateTime<Utc>,
    ) -> Result<Option<RateRefresh>, CoreError> {
        if token != self.generation.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let base = self.settings.base.clone();
        let quote = self.settings.quote.clone();
        let alert_fired =
            self.alert_service
                .observe(self.store.as_mut(), &base, &quote, fetched.rate)?;
        self.last_alert_check.insert(pair_key(&base, &quote), now);
        self.last_quote = Some(fetched.clone());

        Ok(Some(RateRefresh {
            quote: fetched,
            alert_fired,
        }))
    }

    /// The most recently applied quote, if any.
    pub fn last_quote(&self) -> Option<&RateQuote> {
        self.last_quote.as_ref()
    }

    /// Convert a free-text amount at the current quote. Without a quote the
    /// result is 0, except for a self-pair which echoes the amount.
    pub fn convert(&self, amount_text: &str) -> f64 {
        let rate = match &self.last_quote {
            Some(q) => q.rate,
            None => {
                return if self.settings.base == self.settings.quote {
                    conversion::parse_amount(amount_text)
                } else {
                    0.0
                }
            }
        };
        conversion::convert(amount_text, rate, &self.settings.base, &self.settings.quote)
    }

    /// Convert one amount into many target currencies from a single rate
    /// table fetch. Targets equal to the base or absent from the table are
    /// skipped.
    pub async fn multi_convert(
        &mut self,
        amount_text: &str,
        targets: &[&str],
        now: DateTime<Utc>,
    ) -> Result<Vec<ConvertedRow>, CoreError> {
        let base = self.settings.base.clone();
        let table = self
            .rate_service
            .get_table(&self.chain, self.store.as_mut(), &base, now)
            .await?;

        let amount = conversion::parse_amount(amount_text);
        Ok(targets
            .iter()
            .filter(|code| !code.eq_ignore_ascii_case(&base))
            .filter_map(|code| {
                let code = code.to_uppercase();
                let rate = table.rates.get(&code).copied()?;
                Some(ConvertedRow {
                    value: amount * rate,
                    rate,
                    code,
                })
            })
            .collect())
    }

    // ── Trend ───────────────────────────────────────────────────────

    /// Trailing 7-day trend for the active pair. `Ok(None)` when the pair
    /// changed while the fetch was in flight.
    pub async fn fetch_trend(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<TrendPoint>>, CoreError> {
        let token = self.begin_rate_request();
        let base = self.settings.base.clone();
        let quote = self.settings.quote.clone();
        let points = self
            .rate_service
            .get_trend(&self.chain, self.store.as_mut(), &base, &quote, now)
            .await?;
        if token != self.generation.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(points))
    }

    // ── Alerts ──────────────────────────────────────────────────────

    /// Arm an alert for the active pair.
    pub fn set_alert(&mut self, direction: AlertDirection, threshold: f64) -> Result<(), CoreError> {
        let base = self.settings.base.clone();
        let quote = self.settings.quote.clone();
        self.alert_service
            .set(self.store.as_mut(), &base, &quote, AlertConfig::new(direction, threshold))
    }

    /// The alert saved for the active pair, if any.
    pub fn alert(&self) -> Option<Alert> {
        self.alert_service
            .get(self.store.as_ref(), &self.settings.base, &self.settings.quote)
    }

    pub fn remove_alert(&mut self) -> Result<(), CoreError> {
        let base = self.settings.base.clone();
        let quote = self.settings.quote.clone();
        self.alert_service.remove(self.store.as_mut(), &base, &quote)
    }

    /// Reset the active pair's fired alert. Returns false if none is saved.
    pub fn rearm_alert(&mut self) -> Result<bool, CoreError> {
        let base = self.settings.base.clone();
        let quote = self.settings.quote.clone();
        self.alert_service.rearm(self.store.as_mut(), &base, &quote)
    }

    /// Whether the active pair's armed auto-check alert is due for a rate
    /// re-check at `now`.
    pub fn alert_due_for_poll(&self, now: DateTime<Utc>) -> bool {
        let Some(alert) = self.alert() else {
            return false;
        };
        let key = pair_key(&self.settings.base, &self.settings.quote);
        AlertService::due_for_poll(&alert, self.last_alert_check.get(&key).copied(), now)
    }

    // ── Persistence ─────────────────────────────────────────────────

    fn persist_settings(&mut self) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&self.settings)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.store.set(SETTINGS_KEY, &raw)
    }

    fn persist_recent(&mut self) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&self.recent)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        self.store.set(RECENT_PAIRS_KEY, &raw)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    serde_json::from_str(&raw).ok()
}
