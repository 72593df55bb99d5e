use serde::{Deserialize, Serialize};

/// Which side of the threshold triggers the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDirection {
    AtOrAbove,
    AtOrBelow,
}

/// User-configured rate alert for one currency pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub direction: AlertDirection,
    pub threshold: f64,
    /// Re-check the rate on a fixed interval while the alert is armed.
    pub auto_check: bool,
    pub poll_secs: u64,
}

impl AlertConfig {
    pub fn new(direction: AlertDirection, threshold: f64) -> Self {
        Self {
            direction,
            threshold,
            auto_check: true,
            poll_secs: 60,
        }
    }
}

/// A configured alert plus its firing state.
///
/// State machine: an armed alert fires exactly once when an observed rate
/// crosses the threshold; further crossings are ignored until [`Alert::rearm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub config: AlertConfig,
    pub fired: bool,
}

impl Alert {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            fired: false,
        }
    }

    /// Whether `rate` satisfies the configured condition.
    pub fn condition_met(&self, rate: f64) -> bool {
        match self.config.direction {
            AlertDirection::AtOrAbove => rate >= self.config.threshold,
            AlertDirection::AtOrBelow => rate <= self.config.threshold,
        }
    }

    /// Feed a freshly observed rate into the alert. Returns true only on the
    /// single armed → fired transition.
    pub fn observe(&mut self, rate: f64) -> bool {
        if self.fired || !self.condition_met(rate) {
            return false;
        }
        self.fired = true;
        true
    }

    /// Reset the fired flag so the alert can trigger again.
    pub fn rearm(&mut self) {
        self.fired = false;
    }
}
