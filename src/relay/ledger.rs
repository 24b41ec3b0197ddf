//! Message deduplication ledger
//!
//! Best-effort and process-local: the ledger forgets everything on restart
//! and forgets the oldest half once the high-water mark is crossed. A LINE
//! redelivery that arrives after either of those is processed again and may
//! produce a duplicate log row and a duplicate reply. That trade-off is
//! accepted; the ledger only suppresses the common case of the platform
//! retrying a delivery within a short window.

use std::collections::{HashSet, VecDeque};

use crate::config::DEFAULT_DEDUP_CAPACITY;

/// Bounded set of recently handled message IDs
#[derive(Debug)]
pub struct DedupLedger {
    seen: HashSet<String>,
    order: VecDeque<String>,
    high_water: usize,
}

impl Default for DedupLedger {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}

impl DedupLedger {
    /// Create a ledger that trims itself once it holds more than `high_water` IDs
    #[must_use]
    pub fn new(high_water: usize) -> Self {
        let high_water = high_water.max(1);
        Self {
            seen: HashSet::with_capacity(high_water + 1),
            order: VecDeque::with_capacity(high_water + 1),
            high_water,
        }
    }

    /// Whether this message ID has already been handled
    #[must_use]
    pub fn seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record a message ID as handled
    pub fn mark_seen(&mut self, id: &str) {
        if !self.seen.insert(id.to_string()) {
            return;
        }
        self.order.push_back(id.to_string());

        if self.order.len() > self.high_water {
            self.trim();
        }
    }

    /// Check and mark in one step.
    ///
    /// Returns `true` on first sight (the caller owns processing),
    /// `false` if the ID was already recorded.
    pub fn claim(&mut self, id: &str) -> bool {
        if self.seen(id) {
            return false;
        }
        self.mark_seen(id);
        true
    }

    /// Number of IDs currently remembered
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the ledger is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Configured high-water mark
    #[must_use]
    pub const fn high_water(&self) -> usize {
        self.high_water
    }

    /// Evict oldest-inserted IDs down to half the high-water mark
    fn trim(&mut self) {
        let target = self.high_water / 2;
        let before = self.order.len();

        while self.order.len() > target {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }

        tracing::debug!(
            evicted = before - self.order.len(),
            remaining = self.order.len(),
            "trimmed dedup ledger"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sight_is_not_seen() {
        let mut ledger = DedupLedger::default();
        assert!(!ledger.seen("m1"));
        ledger.mark_seen("m1");
        assert!(ledger.seen("m1"));
        assert!(!ledger.seen("m2"));
    }

    #[test]
    fn claim_only_succeeds_once() {
        let mut ledger = DedupLedger::default();
        assert!(ledger.claim("m1"));
        assert!(!ledger.claim("m1"));
        assert!(ledger.claim("m2"));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn marking_twice_does_not_grow() {
        let mut ledger = DedupLedger::new(10);
        ledger.mark_seen("a");
        ledger.mark_seen("a");
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn trims_to_half_past_high_water() {
        let mut ledger = DedupLedger::new(1000);
        for i in 0..=1000 {
            ledger.mark_seen(&format!("m{i}"));
        }

        assert_eq!(ledger.len(), 500);
        // Oldest forgotten, newest retained
        assert!(!ledger.seen("m0"));
        assert!(!ledger.seen("m500"));
        assert!(ledger.seen("m501"));
        assert!(ledger.seen("m1000"));
    }

    #[test]
    fn stays_at_high_water_without_trimming() {
        let mut ledger = DedupLedger::new(4);
        for id in ["a", "b", "c", "d"] {
            ledger.mark_seen(id);
        }
        assert_eq!(ledger.len(), 4);
        assert!(ledger.seen("a"));

        ledger.mark_seen("e");
        assert_eq!(ledger.len(), 2);
        assert!(ledger.seen("d"));
        assert!(ledger.seen("e"));
        assert!(!ledger.seen("a"));
    }

    #[test]
    fn evicted_ids_can_be_claimed_again() {
        let mut ledger = DedupLedger::new(2);
        assert!(ledger.claim("a"));
        assert!(ledger.claim("b"));
        assert!(ledger.claim("c"));
        // "a" was evicted by the trim
        assert!(ledger.claim("a"));
    }

    #[test]
    fn high_water_is_at_least_one() {
        assert_eq!(DedupLedger::new(10).high_water(), 10);
        assert_eq!(DedupLedger::new(0).high_water(), 1);
        assert_eq!(DedupLedger::default().high_water(), DEFAULT_DEDUP_CAPACITY);
    }
}
