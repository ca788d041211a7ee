//! # Cache Trait Seams
//!
//! The two traits the replacement engine implements, split by mutability:
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │          ReadOnlyCache<K, V>            │
//!   │                                         │
//!   │  contains(&, &K) → bool                 │
//!   │  len(&) → usize                         │
//!   │  is_empty(&) → bool                     │
//!   │  capacity(&) → usize                    │
//!   └──────────────────┬──────────────────────┘
//!                      │
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  clear(&mut)                            │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! `get` takes `&mut self` deliberately: under CLOCK-style policies a lookup
//! records a reference bit, so even the read path mutates eviction state.
//! [`contains`](ReadOnlyCache::contains) is the side-effect-free probe.
//!
//! | Trait           | Extends         | Purpose                          |
//! |-----------------|-----------------|----------------------------------|
//! | `ReadOnlyCache` | -               | Probes that never touch policy   |
//! | `CoreCache`     | `ReadOnlyCache` | Operations that drive the policy |

/// Probes that never update access state.
///
/// # Example
///
/// ```
/// use clockpro::policy::clock_pro::ClockProCache;
/// use clockpro::traits::{CoreCache, ReadOnlyCache};
///
/// fn occupancy<C: ReadOnlyCache<u64, String>>(cache: &C) -> (usize, usize) {
///     (cache.len(), cache.capacity())
/// }
///
/// let mut cache = ClockProCache::new(8);
/// cache.insert(1, "one".to_string());
/// assert_eq!(occupancy(&cache), (1, 8));
/// ```
pub trait ReadOnlyCache<K, V> {
    /// Returns `true` if `key` is resident, without touching its reference bit.
    fn contains(&self, key: &K) -> bool;

    /// Returns the number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of resident entries.
    fn capacity(&self) -> usize;
}

/// Operations that drive the eviction policy.
///
/// # Example
///
/// ```
/// use clockpro::policy::clock_pro::ClockProCache;
/// use clockpro::traits::CoreCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = ClockProCache::new(16);
/// warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.get(&1), Some(&"one".to_string()));
/// ```
pub trait CoreCache<K, V>: ReadOnlyCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if the key was
    /// resident. May evict another entry to make room.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key, recording the access.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Removes all entries and resets policy state.
    fn clear(&mut self);
}
