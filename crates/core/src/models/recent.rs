use serde::{Deserialize, Serialize};

use crate::models::rate::pair_key;

/// Maximum number of recently used pairs kept.
pub const RECENT_PAIRS_BOUND: usize = 6;

/// Bounded most-recently-used list of currency pairs, e.g. ["USD->NGN", ...].
///
/// Invariants: never exceeds [`RECENT_PAIRS_BOUND`] entries, never contains
/// duplicates, never contains a self-pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentPairs {
    pairs: Vec<String>,
}

impl RecentPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pair change. Self-pairs are ignored; an existing entry for
    /// the same pair moves to the front instead of duplicating.
    pub fn record(&mut self, base: &str, quote: &str) {
        if base.eq_ignore_ascii_case(quote) {
            return;
        }
        let pair = pair_key(base, quote);
        self.pairs.retain(|p| p != &pair);
        self.pairs.insert(0, pair);
        self.pairs.truncate(RECENT_PAIRS_BOUND);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}
