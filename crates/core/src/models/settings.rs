use serde::{Deserialize, Serialize};

/// UI theme preference, persisted across sessions. Dark is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Dark,
    Light,
}

/// Persisted session settings: theme plus the last active currency pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub base: String,
    pub quote: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            base: "USD".to_string(),
            quote: "NGN".to_string(),
        }
    }
}
