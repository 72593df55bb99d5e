use serde::{Deserialize, Serialize};

/// A single supported currency: ISO-4217 code plus display name.
/// Collections of these are replaced wholesale on each load, never
/// incrementally mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
}

impl Currency {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_uppercase(),
            name: name.to_string(),
        }
    }
}

/// Built-in currency list used when every enumeration source fails.
/// Covers the quick-pick set of the UI plus common majors, so the app
/// stays usable offline.
pub fn fallback_currencies() -> Vec<Currency> {
    let list = [
        ("AUD", "Australian Dollar"),
        ("CAD", "Canadian Dollar"),
        ("CHF", "Swiss Franc"),
        ("CNY", "Chinese Renminbi Yuan"),
        ("EUR", "Euro"),
        ("GBP", "British Pound"),
        ("INR", "Indian Rupee"),
        ("JPY", "Japanese Yen"),
        ("NGN", "Nigerian Naira"),
        ("PLN", "Polish Złoty"),
        ("USD", "United States Dollar"),
        ("ZAR", "South African Rand"),
    ];
    list.iter().map(|(c, n)| Currency::new(c, n)).collect()
}

/// Normalize a freshly loaded currency list: merge in `extra` entries the
/// source omitted (e.g. NGN on providers without it), drop duplicate codes,
/// and sort ascending by code.
pub fn normalize_currency_list(mut list: Vec<Currency>, extra: &[Currency]) -> Vec<Currency> {
    for currency in extra {
        if !list.iter().any(|c| c.code == currency.code) {
            list.push(currency.clone());
        }
    }
    list.sort_by(|a, b| a.code.cmp(&b.code));
    list.dedup_by(|a, b| a.code == b.code);
    list
}
