// ==============================================
// RANDOMIZED AND ADVERSARIAL WORKLOADS
// ==============================================
//
// Seeded random op mixes with invariant sweeps after every operation,
// plus the scan-resistance and adaptation properties that only show up
// over longer runs.

use clockpro::policy::clock_pro::ClockProCache;
use clockpro::traits::{CoreCache, ReadOnlyCache};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ==============================================
// Invariants Under Random Op Mixes
// ==============================================

#[test]
fn random_workloads_preserve_invariants() {
    for &capacity in &[1usize, 2, 3, 5, 8, 21] {
        let mut rng = StdRng::seed_from_u64(0xC10C + capacity as u64);
        let mut cache: ClockProCache<u32, u64> = ClockProCache::new(capacity);
        let keyspace = (capacity as u32) * 4;

        for op in 0..2_000u64 {
            let key = rng.gen_range(0..keyspace);
            if rng.gen_bool(0.6) {
                cache.insert(key, op);
            } else {
                cache.get(&key);
            }
            if let Err(err) = cache.check_invariants() {
                panic!("capacity {capacity}, op {op}: {err}");
            }
        }
    }
}

#[test]
fn overwrites_always_win_reads() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut cache: ClockProCache<u32, u64> = ClockProCache::new(16);
    let mut latest = std::collections::HashMap::new();

    for op in 0..4_000u64 {
        let key = rng.gen_range(0..64u32);
        if rng.gen_bool(0.5) {
            cache.insert(key, op);
            latest.insert(key, op);
        } else if let Some(value) = cache.get(&key) {
            // A resident value is always the most recent write.
            assert_eq!(Some(value), latest.get(&key));
        }
    }
}

// ==============================================
// Scan Resistance
// ==============================================

#[test]
fn live_working_set_survives_long_scan() {
    const CAPACITY: usize = 128;
    const WORKING_SET: u32 = 32;

    let mut cache: ClockProCache<u32, u32> = ClockProCache::new(CAPACITY);
    for key in 0..WORKING_SET {
        cache.insert(key, key);
        cache.get(&key);
        cache.get(&key);
    }

    // One-touch scan keys, two orders of magnitude beyond capacity, with
    // the working set staying live in the background.
    for i in 0..2_000u32 {
        cache.insert(10_000 + i, i);
        cache.get(&(i % WORKING_SET));
    }

    let survived = (0..WORKING_SET).filter(|k| cache.contains(k)).count();
    assert!(
        survived >= 24,
        "expected scan resistance: {survived} of {WORKING_SET} survived"
    );
    cache.check_invariants().unwrap();
}

#[test]
fn pure_scan_drives_cold_target_to_floor() {
    let mut cache: ClockProCache<u32, u32> = ClockProCache::new(64);
    for i in 0..1_000 {
        cache.insert(i, i);
    }
    // Every shadow entry ages out unclaimed, so the cold partition keeps
    // shrinking until it hits its floor.
    assert_eq!(cache.cold_target(), 1);
    assert_eq!(cache.len(), 64);
    cache.check_invariants().unwrap();
}

// ==============================================
// Shadow Recovery After Churn
// ==============================================

#[test]
fn churned_working_set_recovers_hot() {
    const CAPACITY: usize = 32;
    const WORKING_SET: u32 = 8;

    let mut cache: ClockProCache<u32, u32> = ClockProCache::new(CAPACITY);
    for key in 0..WORKING_SET {
        cache.insert(key, key);
    }
    // Churn far past capacity so the working set falls through residence
    // into the shadow list and partially expires.
    for i in 0..CAPACITY as u32 {
        cache.insert(1_000 + i, i);
    }

    // Re-setting a key whose shadow entry still lives promotes it to hot;
    // fully forgotten keys re-enter cold.
    for key in 0..WORKING_SET {
        cache.insert(key, key + 100);
    }
    assert!(cache.hot_count() + cache.cold_count() >= WORKING_SET as usize);
    for key in 0..WORKING_SET {
        assert_eq!(cache.get(&key), Some(&(key + 100)));
    }
    cache.check_invariants().unwrap();
}

// ==============================================
// Adaptation Stays in Range
// ==============================================

#[test]
fn cold_target_stays_within_bounds_under_adversarial_mix() {
    let mut rng = StdRng::seed_from_u64(0xBEEF);
    let mut cache: ClockProCache<u32, u32> = ClockProCache::new(10);

    for i in 0..5_000u32 {
        match rng.gen_range(0..3) {
            // Fresh keys: push residents to shadow, shrink the target.
            0 => {
                cache.insert(100_000 + i, i);
            }
            // Recycled keys: shadow hits widen the target.
            1 => {
                cache.insert(rng.gen_range(0..30), i);
            }
            _ => {
                cache.get(&rng.gen_range(0..30));
            }
        }
        let target = cache.cold_target();
        assert!((1..=cache.capacity()).contains(&target));
        cache.check_invariants().unwrap();
    }
}
