//! Operation counters for the cache, behind the `metrics` feature.
//!
//! [`ClockProMetrics`] is the live counter block owned by the cache and
//! bumped inline on each operation; [`ClockProMetricsSnapshot`] is the
//! `Copy` view handed to callers, with occupancy gauges captured at
//! snapshot time. Counters are cumulative and survive `clear`.

/// Live counters owned by a `ClockProCache`.
#[derive(Debug, Default)]
pub struct ClockProMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    /// Inserts that landed on a shadow entry and re-entered as hot.
    pub shadow_promotions: u64,

    /// Cold pages promoted to hot by the cold hand (reference bit set).
    pub cold_promotions: u64,
    /// Cold pages demoted to shadow by the cold hand.
    pub cold_demotions: u64,
    /// Hot pages demoted to cold by the hot hand.
    pub hot_demotions: u64,
    /// Shadow entries forgotten by the test hand.
    pub test_expiries: u64,

    pub hand_cold_steps: u64,
    pub hand_hot_steps: u64,
    pub hand_test_steps: u64,
}

impl ClockProMetrics {
    /// Captures the counters together with current occupancy gauges.
    pub fn snapshot(
        &self,
        hot: usize,
        cold: usize,
        test: usize,
        cold_target: usize,
        capacity: usize,
    ) -> ClockProMetricsSnapshot {
        ClockProMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_new: self.insert_new,
            insert_updates: self.insert_updates,
            shadow_promotions: self.shadow_promotions,
            cold_promotions: self.cold_promotions,
            cold_demotions: self.cold_demotions,
            hot_demotions: self.hot_demotions,
            test_expiries: self.test_expiries,
            hand_cold_steps: self.hand_cold_steps,
            hand_hot_steps: self.hand_hot_steps,
            hand_test_steps: self.hand_test_steps,
            hot,
            cold,
            test,
            cold_target,
            capacity,
        }
    }
}

/// Point-in-time view of the counters plus occupancy gauges.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockProMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub shadow_promotions: u64,

    pub cold_promotions: u64,
    pub cold_demotions: u64,
    pub hot_demotions: u64,
    pub test_expiries: u64,

    pub hand_cold_steps: u64,
    pub hand_hot_steps: u64,
    pub hand_test_steps: u64,

    // gauges captured at snapshot time
    pub hot: usize,
    pub cold: usize,
    pub test: usize,
    pub cold_target: usize,
    pub capacity: usize,
}

#[cfg(test)]
mod tests {
    use crate::policy::clock_pro::ClockProCache;
    use crate::traits::CoreCache;

    #[test]
    fn counters_track_hits_misses_and_churn() {
        let mut cache = ClockProCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.get(&"a");
        cache.get(&"z");
        cache.insert("c", 3); // evicts one cold page into shadow
        cache.insert("a", 9); // resident or shadow, either bumps a counter

        let snap = cache.metrics_snapshot();
        assert_eq!(snap.get_calls, 2);
        assert_eq!(snap.get_hits, 1);
        assert_eq!(snap.get_misses, 1);
        assert_eq!(snap.insert_calls, 4);
        assert_eq!(snap.insert_new, 3);
        assert_eq!(snap.insert_updates + snap.shadow_promotions, 1);
        assert!(snap.cold_demotions >= 1);
        assert!(snap.hand_cold_steps >= 1);
        assert_eq!(snap.capacity, 2);
        assert_eq!(snap.hot + snap.cold, 2);
    }

    #[test]
    fn snapshot_gauges_follow_populations() {
        let mut cache: ClockProCache<u32, u32> = ClockProCache::new(4);
        for i in 0..12 {
            cache.insert(i, i);
        }
        let snap = cache.metrics_snapshot();
        assert_eq!(snap.hot, cache.hot_count());
        assert_eq!(snap.cold, cache.cold_count());
        assert_eq!(snap.test, cache.test_count());
        assert_eq!(snap.cold_target, cache.cold_target());
        assert!(snap.test_expiries >= 1);
    }
}
