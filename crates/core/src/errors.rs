use thiserror::Error;

/// Unified error type for the entire fx-converter-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("You appear to be offline")]
    Offline,

    #[error("No provider supports the pair {base}/{quote}")]
    NoProvider { base: String, quote: String },

    // ── Domain ──────────────────────────────────────────────────────
    #[error("Currency list unavailable: {0}")]
    CurrencyListUnavailable(String),

    #[error("No exchange rate available for {base} → {quote}")]
    RateUnavailable { base: String, quote: String },

    #[error("Historical trend is not supported for {currency} by any configured provider")]
    TrendUnsupported { currency: String },

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

/// Strips query parameters from any URL embedded in an error message so
/// request details never leak into user-facing text.
pub fn redact_query(message: &str) -> String {
    match message.find('?') {
        Some(idx) => format!("{}?<query redacted>", &message[..idx]),
        None => message.to_string(),
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Connection refused / DNS failure reads as "offline" to the user.
        // A timeout with connectivity up is a provider-side problem and keeps
        // its (redacted) message.
        if e.is_connect() {
            return CoreError::Offline;
        }
        CoreError::Network(redact_query(&e.to_string()))
    }
}
