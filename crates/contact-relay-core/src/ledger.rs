//! Rate-limit ledger: the pruned, ordered set of recent submission
//! timestamps for one actor.
//!
//! Two independent instances exist, one per browser-equivalent install on
//! the client and one per network address on the server, and each blocks on
//! its own threshold. Neither trusts the other.
//!
//! `now` is always passed in explicitly so windowed behavior is testable
//! with a simulated clock.

use serde::{Deserialize, Serialize};

/// Ordered sequence of submission timestamps (epoch seconds) within the
/// trailing window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    entries: Vec<i64>,
}

impl Ledger {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    #[must_use]
    pub const fn from_entries(entries: Vec<i64>) -> Self {
        Self { entries }
    }

    /// Drop entries older than the trailing window. Every read path calls
    /// this first, so the invariant "only in-window timestamps" holds at
    /// each observation point.
    pub fn prune(&mut self, window_secs: u64, now: i64) {
        let window = i64::try_from(window_secs).unwrap_or(i64::MAX);
        let cutoff = now.saturating_sub(window);
        self.entries.retain(|&ts| ts > cutoff);
    }

    /// Whether another submission is currently allowed. Does not mutate.
    #[must_use]
    pub fn allow(&self, max: u32) -> bool {
        self.entries.len() < max as usize
    }

    /// Append the current timestamp. Caller persists afterwards.
    pub fn record(&mut self, now: i64) {
        self.entries.push(now);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[i64] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 3600;

    #[test]
    fn allows_up_to_max_then_blocks() {
        let mut ledger = Ledger::new();
        let now = 1_700_000_000;
        for i in 0..3 {
            ledger.prune(WINDOW, now);
            assert!(ledger.allow(3), "submission {i} should be allowed");
            ledger.record(now + i);
        }
        ledger.prune(WINDOW, now + 3);
        assert!(!ledger.allow(3), "fourth submission within window must block");
    }

    #[test]
    fn window_elapse_frees_capacity_again() {
        let mut ledger = Ledger::new();
        let start = 1_700_000_000;
        for i in 0..3 {
            ledger.record(start + i);
        }
        ledger.prune(WINDOW, start + 10);
        assert!(!ledger.allow(3));

        // Advance a simulated clock past the oldest entry's window.
        let later = start + i64::try_from(WINDOW).unwrap() + 1;
        ledger.prune(WINDOW, later);
        assert!(ledger.allow(3), "expired entries must free capacity");
        // start and start+1 have aged out exactly; only start+2 survives.
        assert_eq!(ledger.entries(), &[start + 2]);
    }

    #[test]
    fn prune_keeps_only_in_window_entries() {
        let mut ledger = Ledger::from_entries(vec![100, 200, 3001, 4000]);
        ledger.prune(1000, 4000);
        assert_eq!(ledger.entries(), &[3001, 4000]);
    }

    #[test]
    fn allow_does_not_mutate() {
        let ledger = Ledger::from_entries(vec![1, 2, 3]);
        let before = ledger.clone();
        let _ = ledger.allow(5);
        assert_eq!(ledger, before);
    }

    #[test]
    fn serializes_as_bare_array() {
        let ledger = Ledger::from_entries(vec![10, 20]);
        assert_eq!(serde_json::to_string(&ledger).unwrap(), "[10,20]");
        let parsed: Ledger = serde_json::from_str("[10,20]").unwrap();
        assert_eq!(parsed, ledger);
    }
}
