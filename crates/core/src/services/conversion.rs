use chrono::{DateTime, Duration, Utc};

/// Quiet window after the last edit before a conversion recomputes.
pub const DEBOUNCE_MILLIS: i64 = 250;

/// Parse a free-text amount. Anything non-numeric (or non-finite) coerces
/// to 0 rather than erroring, matching form-input semantics.
pub fn parse_amount(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

/// Pure conversion: amount × rate. A self-pair returns the amount verbatim
/// regardless of what rate was supplied.
pub fn convert(amount_text: &str, rate: f64, base: &str, quote: &str) -> f64 {
    let amount = parse_amount(amount_text);
    if base.eq_ignore_ascii_case(quote) {
        return amount;
    }
    amount * rate
}

/// Debounces a stream of amount edits against a caller-supplied clock.
///
/// [`Debouncer::settled`] yields the value only once it has been stable for
/// the whole window. The delay is cosmetic (it avoids recomputing on every
/// keystroke), not correctness-affecting.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    value: String,
    changed_at: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::with_window(Duration::milliseconds(DEBOUNCE_MILLIS))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            value: String::new(),
            changed_at: None,
        }
    }

    /// Record an edit. An unchanged value does not restart the window.
    pub fn update(&mut self, text: &str, now: DateTime<Utc>) {
        if self.value == text && self.changed_at.is_some() {
            return;
        }
        self.value = text.to_string();
        self.changed_at = Some(now);
    }

    /// The current value, if it has been quiet for the whole window.
    pub fn settled(&self, now: DateTime<Utc>) -> Option<&str> {
        let changed_at = self.changed_at?;
        if now - changed_at >= self.window {
            Some(&self.value)
        } else {
            None
        }
    }

    /// The latest raw value, settled or not.
    pub fn raw(&self) -> &str {
        &self.value
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
