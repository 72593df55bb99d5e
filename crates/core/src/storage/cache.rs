use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::storage::store::KeyValueStore;

/// Default age after which a cached record stops being served.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Wall-clock expiry policy shared by every cache namespace
/// (rates, rate tables, trends, currency list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub max_age: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::minutes(DEFAULT_TTL_MINUTES),
        }
    }
}

impl TtlPolicy {
    pub fn new(max_age: Duration) -> Self {
        Self { max_age }
    }

    pub fn is_live(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - stored_at <= self.max_age
    }
}

/// A persisted value stamped with its storage time, the shape every
/// TTL-bounded record takes in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub value: T,
    pub stored_at: DateTime<Utc>,
}

impl<T> Stamped<T> {
    pub fn new(value: T, stored_at: DateTime<Utc>) -> Self {
        Self { value, stored_at }
    }
}

/// TTL-bounded cache over an injected [`KeyValueStore`].
///
/// Each fetcher owns its own key namespace, so no coordination is needed
/// between them. Expired entries are deleted on read.
pub struct TtlCache {
    policy: TtlPolicy,
}

impl TtlCache {
    pub fn new(policy: TtlPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TtlPolicy {
        self.policy
    }

    /// Read a live entry; a stale or unreadable entry is removed and treated
    /// as a miss. Never serves past the TTL.
    pub fn get<T: DeserializeOwned>(
        &self,
        store: &mut dyn KeyValueStore,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<T> {
        let raw = store.get(key)?;
        match serde_json::from_str::<Stamped<T>>(&raw) {
            Ok(stamped) if self.policy.is_live(stamped.stored_at, now) => Some(stamped.value),
            _ => {
                // Stale or corrupt; drop it so the next write starts clean.
                let _ = store.remove(key);
                None
            }
        }
    }

    /// Write-through a freshly fetched value stamped at `now`.
    pub fn put<T: Serialize>(
        &self,
        store: &mut dyn KeyValueStore,
        key: &str,
        value: &T,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let stamped = Stamped {
            value,
            stored_at: now,
        };
        let raw = serde_json::to_string(&stamped)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(key, &raw)
    }
}
