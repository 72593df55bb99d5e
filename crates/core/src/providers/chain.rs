use chrono::NaiveDate;

use super::frankfurter::FrankfurterProvider;
use super::open_er_api::OpenErApiProvider;
use super::traits::RateProvider;
use crate::errors::CoreError;
use crate::models::currency::Currency;
use crate::models::rate::{RateQuote, RateTable, TrendPoint};

/// Ordered chain-of-responsibility over all registered rate providers.
///
/// Routing is per currency: a pair containing a code a provider does not
/// support never reaches that provider, so an NGN pair goes straight to the
/// fallback instead of wasting a guaranteed-failing primary call. Among the
/// eligible providers, registration order is priority order and a failure
/// falls through to the next one. New providers can be added without touching
/// fetch or cache logic.
pub struct ProviderChain {
    providers: Vec<Box<dyn RateProvider>>,
}

impl ProviderChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Chain with the default providers: Frankfurter primary,
    /// open.er-api.com fallback.
    pub fn with_defaults() -> Self {
        let mut chain = Self::new();
        chain.register(Box::new(FrankfurterProvider::new()));
        chain.register(Box::new(OpenErApiProvider::new()));
        chain
    }

    /// Register a provider at the end of the chain (lowest priority so far).
    pub fn register(&mut self, provider: Box<dyn RateProvider>) {
        self.providers.push(provider);
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers eligible for a pair, in priority order.
    pub fn providers_for_pair(&self, base: &str, quote: &str) -> Vec<&dyn RateProvider> {
        self.providers
            .iter()
            .filter(|p| p.supports(base) && p.supports(quote))
            .map(|p| p.as_ref())
            .collect()
    }

    /// Enumerate currencies from the first provider able to do so.
    /// The caller degrades to a static list if every provider fails.
    pub async fn currencies(&self) -> Result<Vec<Currency>, CoreError> {
        let mut last_error = None;
        for provider in &self.providers {
            match provider.currencies().await {
                Ok(list) if !list.is_empty() => return Ok(list),
                Ok(_) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: "Empty currency list".into(),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }
        Err(match last_error {
            Some(CoreError::Offline) => CoreError::Offline,
            Some(e) => CoreError::CurrencyListUnavailable(e.to_string()),
            None => CoreError::CurrencyListUnavailable("No providers registered".into()),
        })
    }

    /// Latest rate for a pair, trying eligible providers in order.
    /// A non-finite or non-positive rate from one provider is rejected and
    /// the next provider is consulted.
    pub async fn latest(&self, base: &str, quote: &str) -> Result<RateQuote, CoreError> {
        let eligible = self.providers_for_pair(base, quote);
        if eligible.is_empty() {
            return Err(CoreError::NoProvider {
                base: base.to_uppercase(),
                quote: quote.to_uppercase(),
            });
        }

        let mut last_error = None;
        for provider in eligible {
            match provider.latest(base, quote).await {
                Ok(quote_value) => {
                    if !quote_value.rate.is_finite() || quote_value.rate <= 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid rate returned for {base}/{quote}: {} (must be finite and positive)",
                                quote_value.rate
                            ),
                        });
                        continue;
                    }
                    return Ok(quote_value);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        // All eligible providers failed. Offline keeps its wording; anything
        // else surfaces as the rate-unavailable error the caller expects.
        Err(match last_error {
            Some(CoreError::Offline) => CoreError::Offline,
            _ => CoreError::RateUnavailable {
                base: base.to_uppercase(),
                quote: quote.to_uppercase(),
            },
        })
    }

    /// Full rate table for a base currency, with the same fallback order.
    pub async fn table(&self, base: &str) -> Result<RateTable, CoreError> {
        let eligible: Vec<&dyn RateProvider> = self
            .providers
            .iter()
            .filter(|p| p.supports(base))
            .map(|p| p.as_ref())
            .collect();
        if eligible.is_empty() {
            return Err(CoreError::NoProvider {
                base: base.to_uppercase(),
                quote: "*".into(),
            });
        }

        let mut last_error = None;
        for provider in eligible {
            match provider.table(base).await {
                Ok(table) if !table.rates.is_empty() => return Ok(table),
                Ok(_) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Empty rate table for base {base}"),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(CoreError::Offline) => CoreError::Offline,
            _ => CoreError::RateUnavailable {
                base: base.to_uppercase(),
                quote: "*".into(),
            },
        })
    }

    /// Historical series for a pair. Only series-capable providers that
    /// support both codes are eligible; if there are none, the pair is
    /// declared unsupported rather than reported as a generic fetch failure.
    pub async fn time_series(
        &self,
        base: &str,
        quote: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrendPoint>, CoreError> {
        let eligible: Vec<&dyn RateProvider> = self
            .providers
            .iter()
            .filter(|p| p.supports_time_series() && p.supports(base) && p.supports(quote))
            .map(|p| p.as_ref())
            .collect();

        if eligible.is_empty() {
            // Name the code that broke eligibility for the message.
            let series_capable: Vec<&dyn RateProvider> = self
                .providers
                .iter()
                .filter(|p| p.supports_time_series())
                .map(|p| p.as_ref())
                .collect();
            let culprit = if series_capable.iter().any(|p| p.supports(base)) {
                quote
            } else {
                base
            };
            return Err(CoreError::TrendUnsupported {
                currency: culprit.to_uppercase(),
            });
        }

        let mut last_error = None;
        for provider in eligible {
            match provider.time_series(base, quote, from, to).await {
                Ok(points) => return Ok(points),
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or(CoreError::TrendUnsupported {
            currency: quote.to_uppercase(),
        }))
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}
