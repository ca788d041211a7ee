#![no_main]

use clockpro::policy::clock_pro::ClockProCache;
use clockpro::traits::{CoreCache, ReadOnlyCache};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on ClockProCache
//
// Random sequences of insert, get, contains, and clear against small
// capacities, with the full invariant sweep after every operation. Small
// capacities maximize hand coincidences and single-slot edge cases.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let capacity = (data[0] as usize % 8).max(1);
    let mut cache: ClockProCache<u8, u32> = ClockProCache::new(capacity);

    let mut idx = 1;
    while idx + 1 < data.len() {
        let op = data[idx] % 8;
        let key = data[idx + 1] % 32;

        match op {
            0 | 1 | 2 => {
                cache.insert(key, idx as u32);
            }
            3 | 4 | 5 => {
                let _ = cache.get(&key);
            }
            6 => {
                let _ = cache.contains(&key);
            }
            _ => {
                cache.clear();
            }
        }

        if let Err(err) = cache.check_invariants() {
            panic!("invariant violated after op {op} on key {key}: {err}");
        }
        assert!(cache.len() <= capacity);
        assert!(cache.test_count() <= capacity);

        idx += 2;
    }
});
