use clockpro::policy::clock_pro::ClockProCache;
use clockpro::traits::{CoreCache, ReadOnlyCache};

fn main() {
    let mut cache: ClockProCache<u32, String> = ClockProCache::new(2);

    cache.insert(1, "alpha".to_string());
    cache.insert(2, "beta".to_string());

    if let Some(value) = cache.get(&1) {
        println!("hit 1: {value}");
    }

    cache.insert(3, "gamma".to_string());

    println!("contains 1? {}", cache.contains(&1));
    println!("contains 2? {}", cache.contains(&2));
    println!("shadow entries: {}", cache.test_count());
}

// Expected output:
// hit 1: alpha
// contains 1? true
// contains 2? false
// shadow entries: 1
//
// Explanation: capacity=2; get(&1) sets key 1's reference bit, so when
// inserting key 3 forces an eviction the cold hand gives key 1 a second
// chance and demotes the unreferenced key 2 to the shadow list instead.
// Re-inserting key 2 now would bring it back as a hot page.
