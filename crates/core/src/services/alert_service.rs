use chrono::{DateTime, Duration, Utc};

use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertConfig};
use crate::models::rate::pair_key;
use crate::storage::store::KeyValueStore;

fn alert_key(base: &str, quote: &str) -> String {
    format!("alert:{}", pair_key(base, quote))
}

/// Persists per-pair rate alerts and drives their armed → fired transitions.
///
/// Alerts have no TTL; they live in the store until removed. The firing state
/// is persisted alongside the config so an already-fired alert stays quiet
/// across sessions until re-armed.
pub struct AlertService;

impl AlertService {
    pub fn new() -> Self {
        Self
    }

    /// Save (arm) an alert for a pair, replacing any previous one.
    /// Setting an alert always resets the fired flag.
    pub fn set(
        &self,
        store: &mut dyn KeyValueStore,
        base: &str,
        quote: &str,
        config: AlertConfig,
    ) -> Result<(), CoreError> {
        if !config.threshold.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "Alert threshold must be a finite number, got {}",
                config.threshold
            )));
        }
        let alert = Alert::new(config);
        let raw = serde_json::to_string(&alert)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(&alert_key(base, quote), &raw)
    }

    /// Load the alert for a pair, if one is saved. A corrupt record reads
    /// as absent.
    pub fn get(&self, store: &dyn KeyValueStore, base: &str, quote: &str) -> Option<Alert> {
        let raw = store.get(&alert_key(base, quote))?;
        serde_json::from_str(&raw).ok()
    }

    /// Remove (disarm) the alert for a pair.
    pub fn remove(
        &self,
        store: &mut dyn KeyValueStore,
        base: &str,
        quote: &str,
    ) -> Result<(), CoreError> {
        store.remove(&alert_key(base, quote))
    }

    /// Feed a freshly fetched rate into the pair's alert. Returns true only
    /// on the single armed → fired transition; the updated state is persisted.
    pub fn observe(
        &self,
        store: &mut dyn KeyValueStore,
        base: &str,
        quote: &str,
        rate: f64,
    ) -> Result<bool, CoreError> {
        let Some(mut alert) = self.get(store, base, quote) else {
            return Ok(false);
        };
        let fired_now = alert.observe(rate);
        if fired_now {
            let raw = serde_json::to_string(&alert)
                .map_err(|e| CoreError::Serialization(e.to_string()))?;
            store.set(&alert_key(base, quote), &raw)?;
        }
        Ok(fired_now)
    }

    /// Reset a fired alert so it can trigger again. Returns false if no alert
    /// is saved for the pair.
    pub fn rearm(
        &self,
        store: &mut dyn KeyValueStore,
        base: &str,
        quote: &str,
    ) -> Result<bool, CoreError> {
        let Some(mut alert) = self.get(store, base, quote) else {
            return Ok(false);
        };
        alert.rearm();
        let raw = serde_json::to_string(&alert)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        store.set(&alert_key(base, quote), &raw)?;
        Ok(true)
    }

    /// Whether an armed auto-check alert is due for a rate re-check.
    /// `last_checked = None` means a check is due immediately.
    pub fn due_for_poll(
        alert: &Alert,
        last_checked: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        if alert.fired || !alert.config.auto_check {
            return false;
        }
        match last_checked {
            None => true,
            Some(at) => now - at >= Duration::seconds(alert.config.poll_secs as i64),
        }
    }
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}
