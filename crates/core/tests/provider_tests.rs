// ═══════════════════════════════════════════════════════════════════
// Provider Tests — ProviderChain routing, fallback ordering,
// Frankfurter / open.er-api.com capability declarations
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use fx_converter_core::errors::CoreError;
use fx_converter_core::models::currency::Currency;
use fx_converter_core::models::rate::{RateQuote, RateTable, TrendPoint};
use fx_converter_core::providers::chain::ProviderChain;
use fx_converter_core::providers::frankfurter::FrankfurterProvider;
use fx_converter_core::providers::open_er_api::OpenErApiProvider;
use fx_converter_core::providers::traits::RateProvider;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider serving a fixed rate for a fixed set of codes.
struct MockProvider {
    name: String,
    codes: Vec<String>,
    series: bool,
    rate: f64,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new(name: &str, codes: &[&str], rate: f64) -> Self {
        Self {
            name: name.to_string(),
            codes: codes.iter().map(|c| c.to_string()).collect(),
            series: true,
            rate,
            calls: AtomicUsize::new(0),
        }
    }

    fn without_series(mut self) -> Self {
        self.series = false;
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == &code.to_uppercase())
    }

    fn supports_time_series(&self) -> bool {
        self.series
    }

    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .codes
            .iter()
            .map(|c| Currency::new(c, &format!("{c} name")))
            .collect())
    }

    async fn latest(&self, _base: &str, _quote: &str) -> Result<RateQuote, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RateQuote::new(self.rate, date("2026-08-25")))
    }

    async fn table(&self, base: &str) -> Result<RateTable, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rates = HashMap::new();
        for code in &self.codes {
            if !code.eq_ignore_ascii_case(base) {
                rates.insert(code.clone(), self.rate);
            }
        }
        Ok(RateTable {
            as_of: date("2026-08-25"),
            rates,
        })
    }

    async fn time_series(
        &self,
        _base: &str,
        _quote: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut points = Vec::new();
        let mut d = from;
        while d <= to {
            points.push(TrendPoint {
                date: d,
                value: self.rate,
            });
            d = d.succ_opt().unwrap();
        }
        Ok(points)
    }
}

/// A mock provider that always fails, either as a provider error or as an
/// offline-classified network failure.
struct FailingProvider {
    name: String,
    codes: Vec<String>,
    offline: bool,
    calls: AtomicUsize,
}

impl FailingProvider {
    fn new(name: &str, codes: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            codes: codes.iter().map(|c| c.to_string()).collect(),
            offline: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn error(&self) -> CoreError {
        if self.offline {
            CoreError::Offline
        } else {
            CoreError::Api {
                provider: self.name.clone(),
                message: "provider down".into(),
            }
        }
    }
}

#[async_trait]
impl RateProvider for FailingProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == &code.to_uppercase())
    }

    fn supports_time_series(&self) -> bool {
        true
    }

    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error())
    }

    async fn latest(&self, _base: &str, _quote: &str) -> Result<RateQuote, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error())
    }

    async fn table(&self, _base: &str) -> Result<RateTable, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error())
    }

    async fn time_series(
        &self,
        _base: &str,
        _quote: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error())
    }
}

/// A mock provider returning a rate that must be rejected by validation.
struct BadRateProvider {
    rate: f64,
}

#[async_trait]
impl RateProvider for BadRateProvider {
    fn name(&self) -> &str {
        "BadRate"
    }

    fn supports(&self, _code: &str) -> bool {
        true
    }

    fn supports_time_series(&self) -> bool {
        false
    }

    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        Ok(vec![])
    }

    async fn latest(&self, _base: &str, _quote: &str) -> Result<RateQuote, CoreError> {
        Ok(RateQuote::new(self.rate, date("2026-08-25")))
    }

    async fn table(&self, _base: &str) -> Result<RateTable, CoreError> {
        Ok(RateTable {
            as_of: date("2026-08-25"),
            rates: HashMap::new(),
        })
    }

    async fn time_series(
        &self,
        _base: &str,
        _quote: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        Ok(vec![])
    }
}

const MAJORS: &[&str] = &["USD", "EUR", "GBP", "JPY"];
const MAJORS_PLUS_NGN: &[&str] = &["USD", "EUR", "GBP", "JPY", "NGN"];

// ═══════════════════════════════════════════════════════════════════
// ProviderChain — routing
// ═══════════════════════════════════════════════════════════════════

mod routing {
    use super::*;

    #[tokio::test]
    async fn pair_unsupported_by_primary_skips_it_entirely() {
        // Primary has no NGN; the NGN pair must go straight to the fallback
        // without a wasted primary call.
        let primary = MockProvider::new("Primary", MAJORS, 0.9);
        let fallback = MockProvider::new("Fallback", MAJORS_PLUS_NGN, 1550.25);

        let mut chain = ProviderChain::new();
        let primary_ref: &'static MockProvider = Box::leak(Box::new(primary));
        let fallback_ref: &'static MockProvider = Box::leak(Box::new(fallback));
        chain.register(Box::new(ForwardingProvider(primary_ref)));
        chain.register(Box::new(ForwardingProvider(fallback_ref)));

        let quote = chain.latest("USD", "NGN").await.unwrap();
        assert_eq!(quote.rate, 1550.25);
        assert_eq!(primary_ref.call_count(), 0);
        assert_eq!(fallback_ref.call_count(), 1);
    }

    #[tokio::test]
    async fn supported_pair_uses_primary_first() {
        let primary_ref: &'static MockProvider =
            Box::leak(Box::new(MockProvider::new("Primary", MAJORS, 0.9)));
        let fallback_ref: &'static MockProvider =
            Box::leak(Box::new(MockProvider::new("Fallback", MAJORS_PLUS_NGN, 0.95)));

        let mut chain = ProviderChain::new();
        chain.register(Box::new(ForwardingProvider(primary_ref)));
        chain.register(Box::new(ForwardingProvider(fallback_ref)));

        let quote = chain.latest("USD", "EUR").await.unwrap();
        assert_eq!(quote.rate, 0.9);
        assert_eq!(fallback_ref.call_count(), 0);
    }

    #[tokio::test]
    async fn no_supporting_provider_is_no_provider_error() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(MockProvider::new("Primary", MAJORS, 0.9)));

        let err = chain.latest("USD", "XXX").await.unwrap_err();
        assert!(matches!(err, CoreError::NoProvider { .. }));
    }

    #[tokio::test]
    async fn empty_chain_is_no_provider_error() {
        let chain = ProviderChain::new();
        let err = chain.latest("USD", "EUR").await.unwrap_err();
        assert!(matches!(err, CoreError::NoProvider { .. }));
    }
}

/// Wraps a leaked mock so the test can keep inspecting its call counter
/// after the chain takes ownership.
struct ForwardingProvider(&'static MockProvider);

#[async_trait]
impl RateProvider for ForwardingProvider {
    fn name(&self) -> &str {
        self.0.name()
    }
    fn supports(&self, code: &str) -> bool {
        self.0.supports(code)
    }
    fn supports_time_series(&self) -> bool {
        self.0.supports_time_series()
    }
    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        self.0.currencies().await
    }
    async fn latest(&self, base: &str, quote: &str) -> Result<RateQuote, CoreError> {
        self.0.latest(base, quote).await
    }
    async fn table(&self, base: &str) -> Result<RateTable, CoreError> {
        self.0.table(base).await
    }
    async fn time_series(
        &self,
        base: &str,
        quote: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        self.0.time_series(base, quote, from, to).await
    }
}

struct ForwardingFailing(&'static FailingProvider);

#[async_trait]
impl RateProvider for ForwardingFailing {
    fn name(&self) -> &str {
        self.0.name()
    }
    fn supports(&self, code: &str) -> bool {
        self.0.supports(code)
    }
    fn supports_time_series(&self) -> bool {
        self.0.supports_time_series()
    }
    async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        self.0.currencies().await
    }
    async fn latest(&self, base: &str, quote: &str) -> Result<RateQuote, CoreError> {
        self.0.latest(base, quote).await
    }
    async fn table(&self, base: &str) -> Result<RateTable, CoreError> {
        self.0.table(base).await
    }
    async fn time_series(
        &self,
        base: &str,
        quote: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        self.0.time_series(base, quote, from, to).await
    }
}

// ═══════════════════════════════════════════════════════════════════
// ProviderChain — fallback
// ═══════════════════════════════════════════════════════════════════

mod fallback {
    use super::*;

    #[tokio::test]
    async fn primary_failure_falls_through_to_secondary() {
        let failing_ref: &'static FailingProvider =
            Box::leak(Box::new(FailingProvider::new("Primary", MAJORS)));
        let backup_ref: &'static MockProvider =
            Box::leak(Box::new(MockProvider::new("Fallback", MAJORS, 0.95)));

        let mut chain = ProviderChain::new();
        chain.register(Box::new(ForwardingFailing(failing_ref)));
        chain.register(Box::new(ForwardingProvider(backup_ref)));

        let quote = chain.latest("USD", "EUR").await.unwrap();
        assert_eq!(quote.rate, 0.95);
        assert_eq!(failing_ref.call_count(), 1);
        assert_eq!(backup_ref.call_count(), 1);
    }

    #[tokio::test]
    async fn both_fail_surfaces_rate_unavailable() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(FailingProvider::new("A", MAJORS)));
        chain.register(Box::new(FailingProvider::new("B", MAJORS)));

        let err = chain.latest("USD", "EUR").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::RateUnavailable { ref base, ref quote } if base == "USD" && quote == "EUR"
        ));
    }

    #[tokio::test]
    async fn offline_wording_is_preserved() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(FailingProvider::new("A", MAJORS)));
        chain.register(Box::new(FailingProvider::new("B", MAJORS).offline()));

        let err = chain.latest("USD", "EUR").await.unwrap_err();
        assert!(matches!(err, CoreError::Offline));
    }

    #[tokio::test]
    async fn invalid_rate_falls_through_to_next_provider() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(BadRateProvider { rate: 0.0 }));
        chain.register(Box::new(MockProvider::new("Good", MAJORS, 0.9)));

        let quote = chain.latest("USD", "EUR").await.unwrap();
        assert_eq!(quote.rate, 0.9);
    }

    #[tokio::test]
    async fn nan_rate_is_rejected() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(BadRateProvider { rate: f64::NAN }));

        // BadRateProvider claims support for everything, so the chain tries
        // it and rejects the value.
        let err = chain.latest("USD", "EUR").await.unwrap_err();
        assert!(matches!(err, CoreError::RateUnavailable { .. }));
    }

    #[tokio::test]
    async fn table_falls_back_too() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(FailingProvider::new("A", MAJORS)));
        chain.register(Box::new(MockProvider::new("B", MAJORS_PLUS_NGN, 2.0)));

        let table = chain.table("USD").await.unwrap();
        assert_eq!(table.rates.get("NGN"), Some(&2.0));
        assert!(!table.rates.contains_key("USD"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ProviderChain — currencies & time series
// ═══════════════════════════════════════════════════════════════════

mod currencies {
    use super::*;

    #[tokio::test]
    async fn first_successful_provider_wins() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(FailingProvider::new("A", MAJORS)));
        chain.register(Box::new(MockProvider::new("B", MAJORS, 1.0)));

        let list = chain.currencies().await.unwrap();
        assert_eq!(list.len(), MAJORS.len());
    }

    #[tokio::test]
    async fn all_failing_is_currency_list_unavailable() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(FailingProvider::new("A", MAJORS)));

        let err = chain.currencies().await.unwrap_err();
        assert!(matches!(err, CoreError::CurrencyListUnavailable(_)));
    }
}

mod time_series {
    use super::*;

    #[tokio::test]
    async fn unsupported_currency_is_declared_not_generic() {
        // The only series-capable provider has no NGN, and the NGN-capable
        // provider has no series, so the pair gets a declared
        // "unsupported" error instead of a generic fetch failure.
        let mut chain = ProviderChain::new();
        chain.register(Box::new(MockProvider::new("Series", MAJORS, 0.9)));
        chain.register(
            Box::new(MockProvider::new("NoSeries", MAJORS_PLUS_NGN, 1550.0).without_series()),
        );

        let err = chain
            .time_series("USD", "NGN", date("2026-08-19"), date("2026-08-26"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::TrendUnsupported { ref currency } if currency == "NGN"
        ));
    }

    #[tokio::test]
    async fn supported_pair_returns_ascending_points() {
        let mut chain = ProviderChain::new();
        chain.register(Box::new(MockProvider::new("Series", MAJORS, 0.9)));

        let points = chain
            .time_series("USD", "EUR", date("2026-08-19"), date("2026-08-26"))
            .await
            .unwrap();
        assert!(!points.is_empty());
        assert!(points.windows(2).all(|w| w[0].date < w[1].date));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Real provider capability declarations (no network)
// ═══════════════════════════════════════════════════════════════════

mod capabilities {
    use super::*;

    #[test]
    fn frankfurter_has_no_ngn_but_has_majors() {
        let p = FrankfurterProvider::new();
        assert!(!p.supports("NGN"));
        assert!(p.supports("USD"));
        assert!(p.supports("eur"));
        assert!(p.supports_time_series());
        assert_eq!(p.name(), "Frankfurter");
    }

    #[test]
    fn open_er_api_covers_ngn_without_series() {
        let p = OpenErApiProvider::new();
        assert!(p.supports("NGN"));
        assert!(p.supports("USD"));
        assert!(!p.supports("NOTACODE"));
        assert!(!p.supports("US"));
        assert!(!p.supports_time_series());
        assert_eq!(p.name(), "open.er-api.com");
    }

    #[tokio::test]
    async fn open_er_api_cannot_enumerate_currencies() {
        let p = OpenErApiProvider::new();
        let err = p.currencies().await.unwrap_err();
        assert!(matches!(err, CoreError::CurrencyListUnavailable(_)));
    }

    #[tokio::test]
    async fn open_er_api_time_series_is_unsupported() {
        let p = OpenErApiProvider::new();
        let err = p
            .time_series("USD", "NGN", date("2026-08-19"), date("2026-08-26"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TrendUnsupported { .. }));
    }
}
