use chrono::{DateTime, Utc};

use crate::models::currency::{fallback_currencies, normalize_currency_list, Currency};
use crate::providers::chain::ProviderChain;
use crate::storage::cache::{TtlCache, TtlPolicy};
use crate::storage::store::KeyValueStore;

const CACHE_KEY: &str = "currencies";

/// Loads the supported-currency list once per session.
///
/// Flow: TTL cache → provider chain → static fallback list. A failed load
/// never surfaces as an error; the UI stays usable on the built-in list.
/// Successful loads are written through to the store so later session starts
/// skip the network call.
pub struct CurrencyService {
    cache: TtlCache,
}

impl CurrencyService {
    pub fn new(policy: TtlPolicy) -> Self {
        Self {
            cache: TtlCache::new(policy),
        }
    }

    /// Extra entries merged into every loaded list. NGN is guaranteed present
    /// even when the enumerating provider omits it.
    fn guaranteed() -> Vec<Currency> {
        vec![Currency::new("NGN", "Nigerian Naira")]
    }

    /// Get the currency list, preferring a live cached copy.
    pub async fn load(
        &self,
        chain: &ProviderChain,
        store: &mut dyn KeyValueStore,
        now: DateTime<Utc>,
    ) -> Vec<Currency> {
        if let Some(list) = self.cache.get::<Vec<Currency>>(store, CACHE_KEY, now) {
            return list;
        }
        self.fetch(chain, store, now).await
    }

    /// Force a fresh load, ignoring any cached copy. Used by manual reload.
    pub async fn reload(
        &self,
        chain: &ProviderChain,
        store: &mut dyn KeyValueStore,
        now: DateTime<Utc>,
    ) -> Vec<Currency> {
        let _ = store.remove(CACHE_KEY);
        self.fetch(chain, store, now).await
    }

    async fn fetch(
        &self,
        chain: &ProviderChain,
        store: &mut dyn KeyValueStore,
        now: DateTime<Utc>,
    ) -> Vec<Currency> {
        match chain.currencies().await {
            Ok(list) => {
                let list = normalize_currency_list(list, &Self::guaranteed());
                // Cache write failure is not worth failing the load over.
                let _ = self.cache.put(store, CACHE_KEY, &list, now);
                list
            }
            Err(_) => fallback_currencies(),
        }
    }
}
