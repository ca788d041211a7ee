//! CLOCK-Pro cache replacement policy.
//!
//! A scan-resistant, low-overhead approximation of LIRS. Every tracked key
//! owns one node on a circular metadata ring; three clock hands sweep the
//! ring and move each key between three states: hot (protected resident),
//! cold (resident on probation), and test (non-resident shadow history that
//! recognizes re-references).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                       ClockProCache<K, V> Layout                     │
//! │                                                                      │
//! │   ┌────────────────────────────────────────────────────────────────┐ │
//! │   │  index: FxHashMap<K, NodeId>   (key -> node, resident or test) │ │
//! │   └────────────────────────────────────────────────────────────────┘ │
//! │                                                                      │
//! │   ┌────────────────────────────────────────────────────────────────┐ │
//! │   │  ring: RingArena<MetaEntry<K, V>>   (circular, no front)       │ │
//! │   │                                                                │ │
//! │   │        ┌────[H]◄───[c]◄───[t]◄───[C]◄───[h]◄───[t]────┐        │ │
//! │   │        └────────────────────►──────────────────────────┘       │ │
//! │   │              ▲             ▲                   ▲               │ │
//! │   │          hand_hot      hand_test           hand_cold           │ │
//! │   └────────────────────────────────────────────────────────────────┘ │
//! │                                                                      │
//! │   H/h: hot (ref set / clear)    C/c: cold    t: test (no value)      │
//! │                                                                      │
//! │   Sizing: mem_max  = fixed resident capacity (hot + cold)            │
//! │           mem_cold = adaptive cold target in [1, mem_max]            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Algorithm
//!
//! ```text
//! GET(key):
//!   resident (hot or cold) -> set referenced, return value
//!   test or unknown        -> miss
//!
//! SET(key, value):
//!   resident -> overwrite value, set referenced
//!   test     -> widen cold target, relink node before hand_hot as HOT
//!   unknown  -> link new COLD node before hand_hot (evicting first)
//!
//! hand_cold:  cold+ref   -> promote to hot
//!             cold+unref -> demote to test, drop value;
//!                           expire shadow while over capacity
//!             then rebalance: demote hot pages while over the hot budget
//! hand_hot:   hot+ref    -> clear bit (second chance)
//!             hot+unref  -> demote to cold
//! hand_test:  test       -> forget the key, shrink cold target
//! ```
//!
//! The cold target self-tunes: a `set` that lands on a test entry means the
//! key came back while its history was still tracked, so the cold partition
//! widens; a test entry aging out unclaimed shrinks it. Hands advance one
//! ring step per invocation, and a hand that coincides with the hand ahead
//! of it first runs that hand's step so neither can stall on the other.
//!
//! ## Scan Resistance
//!
//! Sequential scans enter as cold pages and need a second access before the
//! cold hand reaches them to earn hot status. One-touch scan keys fall
//! through to the test list and age out without displacing the hot set.
//!
//! ## Performance Characteristics
//!
//! | Operation | Time        | Notes                                  |
//! |-----------|-------------|----------------------------------------|
//! | `get`     | O(1)        | Hash lookup + reference bit            |
//! | `insert`  | O(1)*       | *Amortized, eviction sweeps the ring   |
//! | `contains`| O(1)        | Hash lookup only                       |
//!
//! ## Example Usage
//!
//! ```
//! use clockpro::policy::clock_pro::ClockProCache;
//! use clockpro::traits::{CoreCache, ReadOnlyCache};
//!
//! let mut cache: ClockProCache<String, String> = ClockProCache::new(100);
//!
//! // New inserts start cold.
//! cache.insert("page1".to_string(), "content1".to_string());
//! assert_eq!(cache.get(&"page1".to_string()), Some(&"content1".to_string()));
//!
//! // A scan churns through cold pages and the shadow list;
//! // at most 2 * capacity keys are ever tracked.
//! for i in 0..300 {
//!     cache.insert(format!("scan_{i}"), format!("data_{i}"));
//! }
//! assert!(cache.len() <= cache.capacity());
//! assert!(cache.test_count() <= cache.capacity());
//! ```

use crate::ds::{NodeId, RingArena};
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::{ClockProMetrics, ClockProMetricsSnapshot};
use crate::traits::{CoreCache, ReadOnlyCache};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::hash::Hash;

const HANDS_MISSING: &str = "clock hands unset while ring is populated";
const STALE_HAND: &str = "clock hand points at a freed ring node";
const STALE_INDEX: &str = "key index points at a freed ring node";

/// Residency state of a tracked key.
///
/// `Test` carries no value, so "shadow entries hold no payload" is enforced
/// by construction rather than by a nullable field.
#[derive(Debug)]
enum Page<V> {
    /// Protected resident; only `hand_hot` may demote it.
    Hot { value: V, referenced: bool },
    /// Resident on probation; promoted or demoted by `hand_cold`.
    Cold { value: V, referenced: bool },
    /// Non-resident shadow history awaiting re-reference or expiry.
    Test,
}

#[derive(Debug)]
struct MetaEntry<K, V> {
    key: K,
    page: Page<V>,
}

/// The three clock hands. Present exactly when the ring is non-empty;
/// hands may coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Hands {
    hot: NodeId,
    cold: NodeId,
    test: NodeId,
}

/// CLOCK-Pro cache with an adaptive hot/cold partition.
///
/// Not internally synchronized: callers sharing a cache across threads must
/// serialize all access (including `get`, which flips the reference bit).
/// [`ConcurrentClockProCache`] wraps one behind a mutex for that case.
pub struct ClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Maps keys to ring nodes, for residents and shadow entries alike.
    index: FxHashMap<K, NodeId>,
    /// Circular metadata ring; holds at most `2 * mem_max` nodes.
    ring: RingArena<MetaEntry<K, V>>,
    hands: Option<Hands>,
    /// Fixed resident capacity in entries.
    mem_max: usize,
    /// Adaptive cold-partition target, kept in `[1, mem_max]`.
    mem_cold: usize,
    count_hot: usize,
    count_cold: usize,
    count_test: usize,
    #[cfg(feature = "metrics")]
    metrics: ClockProMetrics,
}

impl<K, V> ClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding at most `capacity` resident entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; use [`try_new`](Self::try_new) to
    /// handle that without panicking.
    ///
    /// # Example
    ///
    /// ```
    /// use clockpro::policy::clock_pro::ClockProCache;
    /// use clockpro::traits::ReadOnlyCache;
    ///
    /// let cache: ClockProCache<String, i32> = ClockProCache::new(100);
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(cache.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible constructor: rejects a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("capacity must be at least 1"));
        }
        let tracked = capacity.saturating_mul(2);
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(tracked, Default::default()),
            ring: RingArena::with_capacity(tracked),
            hands: None,
            mem_max: capacity,
            mem_cold: capacity,
            count_hot: 0,
            count_cold: 0,
            count_test: 0,
            #[cfg(feature = "metrics")]
            metrics: ClockProMetrics::default(),
        })
    }

    /// Returns `true` if no entries are resident.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count_hot + self.count_cold == 0
    }

    /// Returns the number of hot pages.
    #[inline]
    pub fn hot_count(&self) -> usize {
        self.count_hot
    }

    /// Returns the number of cold pages.
    #[inline]
    pub fn cold_count(&self) -> usize {
        self.count_cold
    }

    /// Returns the number of shadow (test) entries.
    #[inline]
    pub fn test_count(&self) -> usize {
        self.count_test
    }

    /// Returns the current adaptive cold-partition target.
    #[inline]
    pub fn cold_target(&self) -> usize {
        self.mem_cold
    }

    /// Returns a snapshot of the operation counters.
    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> ClockProMetricsSnapshot {
        self.metrics.snapshot(
            self.count_hot,
            self.count_cold,
            self.count_test,
            self.mem_cold,
            self.mem_max,
        )
    }

    /// Cross-checks the ring, index, hands, and counters.
    ///
    /// An `Err` indicates a defect in the engine, not a caller error. Used
    /// by the integration tests and fuzz targets after every operation.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut hot = 0usize;
        let mut cold = 0usize;
        let mut test = 0usize;
        for (id, entry) in self.ring.iter() {
            match entry.page {
                Page::Hot { .. } => hot += 1,
                Page::Cold { .. } => cold += 1,
                Page::Test => test += 1,
            }
            match self.index.get(&entry.key) {
                Some(&mapped) if mapped == id => {}
                Some(_) => {
                    return Err(InvariantError::new("index maps a key to a different node"));
                }
                None => return Err(InvariantError::new("ring node missing from index")),
            }
        }

        if (hot, cold, test) != (self.count_hot, self.count_cold, self.count_test) {
            return Err(InvariantError::new(format!(
                "population counters drifted: counted {hot}/{cold}/{test}, \
                 recorded {}/{}/{}",
                self.count_hot, self.count_cold, self.count_test
            )));
        }
        if self.index.len() != self.ring.len() {
            return Err(InvariantError::new("index and ring disagree on size"));
        }
        if self.count_hot + self.count_cold > self.mem_max {
            return Err(InvariantError::new("resident count exceeds capacity"));
        }
        if self.count_test > self.mem_max {
            return Err(InvariantError::new("shadow count exceeds capacity"));
        }
        if self.mem_cold < 1 || self.mem_cold > self.mem_max {
            return Err(InvariantError::new("cold target out of range"));
        }

        match self.hands {
            None => {
                if !self.ring.is_empty() {
                    return Err(InvariantError::new("hands unset on a populated ring"));
                }
            }
            Some(hands) => {
                if self.ring.is_empty() {
                    return Err(InvariantError::new("hands set on an empty ring"));
                }
                for hand in [hands.hot, hands.cold, hands.test] {
                    if !self.ring.contains(hand) {
                        return Err(InvariantError::new("hand points at a freed node"));
                    }
                }
                // The ring must be a single cycle covering every node.
                let mut cursor = hands.hot;
                for _ in 0..self.ring.len() {
                    cursor = self.ring.next(cursor);
                }
                if cursor != hands.hot {
                    return Err(InvariantError::new("ring traversal does not close"));
                }
            }
        }
        Ok(())
    }

    /// Links `key` onto the ring immediately before `hand_hot`, evicting
    /// residents first so capacity holds after the insert.
    fn meta_add(&mut self, key: K, page: Page<V>) {
        self.evict();
        let entry = MetaEntry {
            key: key.clone(),
            page,
        };
        let id = match self.hands {
            None => {
                let id = self.ring.insert_first(entry);
                self.hands = Some(Hands {
                    hot: id,
                    cold: id,
                    test: id,
                });
                id
            }
            // The slot just behind hand_hot is the conventional insertion
            // point: hand_cold will reach the new node in due course.
            Some(hands) => self.ring.insert_before(hands.hot, entry),
        };
        self.index.insert(key, id);
    }

    /// Unlinks a node. Any hand parked on it retreats to its predecessor so
    /// hands always denote live nodes; removing the sole node clears them.
    fn meta_del(&mut self, id: NodeId) {
        if self.ring.len() == 1 {
            self.hands = None;
        } else {
            let prev = self.ring.prev(id);
            if let Some(hands) = self.hands.as_mut() {
                if hands.hot == id {
                    hands.hot = prev;
                }
                if hands.cold == id {
                    hands.cold = prev;
                }
                if hands.test == id {
                    hands.test = prev;
                }
            }
        }
        let entry = self.ring.remove(id).expect("ring node vanished during unlink");
        self.index.remove(&entry.key);
    }

    fn evict(&mut self) {
        while self.count_hot + self.count_cold >= self.mem_max {
            self.hand_cold();
        }
    }

    /// One cold-hand step followed by hot-budget rebalancing.
    fn hand_cold(&mut self) {
        self.hand_cold_step();
        while self.count_hot > self.mem_max - self.mem_cold {
            self.hand_hot();
        }
    }

    /// Examines the node under the cold hand and advances one step.
    ///
    /// Split from [`hand_cold`](Self::hand_cold) for the sole-node ring,
    /// where the coincidence guard in `hand_test` must advance the cold
    /// hand without re-entering the hot rebalancing loop; the enclosing
    /// sweep re-checks the hot budget after every nested step, so
    /// rebalancing still settles before control returns to the caller.
    fn hand_cold_step(&mut self) {
        #[cfg(feature = "metrics")]
        {
            self.metrics.hand_cold_steps += 1;
        }
        let id = self.hands.expect(HANDS_MISSING).cold;
        let entry = self.ring.get_mut(id).expect(STALE_HAND);
        match std::mem::replace(&mut entry.page, Page::Test) {
            Page::Cold {
                value,
                referenced: true,
            } => {
                entry.page = Page::Hot {
                    value,
                    referenced: false,
                };
                self.count_cold -= 1;
                self.count_hot += 1;
                #[cfg(feature = "metrics")]
                {
                    self.metrics.cold_promotions += 1;
                }
            }
            Page::Cold {
                referenced: false, ..
            } => {
                // Value dropped here; only the key survives, as shadow.
                self.count_cold -= 1;
                self.count_test += 1;
                #[cfg(feature = "metrics")]
                {
                    self.metrics.cold_demotions += 1;
                }
                while self.count_test > self.mem_max {
                    self.hand_test();
                }
            }
            other => entry.page = other,
        }
        let hands = self.hands.as_mut().expect(HANDS_MISSING);
        hands.cold = self.ring.next(hands.cold);
    }

    fn hand_hot(&mut self) {
        #[cfg(feature = "metrics")]
        {
            self.metrics.hand_hot_steps += 1;
        }
        let hands = self.hands.expect(HANDS_MISSING);
        if hands.hot == hands.test {
            self.hand_test();
        }
        // Re-read: the nested step may have moved this hand.
        let id = self.hands.expect(HANDS_MISSING).hot;
        let entry = self.ring.get_mut(id).expect(STALE_HAND);
        match std::mem::replace(&mut entry.page, Page::Test) {
            Page::Hot {
                value,
                referenced: true,
            } => {
                entry.page = Page::Hot {
                    value,
                    referenced: false,
                };
            }
            Page::Hot {
                value,
                referenced: false,
            } => {
                entry.page = Page::Cold {
                    value,
                    referenced: false,
                };
                self.count_hot -= 1;
                self.count_cold += 1;
                #[cfg(feature = "metrics")]
                {
                    self.metrics.hot_demotions += 1;
                }
            }
            other => entry.page = other,
        }
        let hands = self.hands.as_mut().expect(HANDS_MISSING);
        hands.hot = self.ring.next(hands.hot);
    }

    fn hand_test(&mut self) {
        #[cfg(feature = "metrics")]
        {
            self.metrics.hand_test_steps += 1;
        }
        let hands = self.hands.expect(HANDS_MISSING);
        if hands.test == hands.cold {
            // Full cold-hand pass, rebalancing included. A sole-node ring
            // is the one case where that pass can never reach an examine
            // step (all three hands pin the same node and the advance is a
            // no-op, so the guard chain re-enters itself forever); it gets
            // the bare step instead.
            if self.ring.len() == 1 {
                self.hand_cold_step();
            } else {
                self.hand_cold();
            }
        }
        let id = self.hands.expect(HANDS_MISSING).test;
        let expired = matches!(self.ring.get(id).expect(STALE_HAND).page, Page::Test);
        if expired {
            // meta_del parks this hand on the predecessor, so the advance
            // below lands on the node that followed the expired one.
            self.meta_del(id);
            self.count_test -= 1;
            if self.mem_cold > 1 {
                self.mem_cold -= 1;
            }
            #[cfg(feature = "metrics")]
            {
                self.metrics.test_expiries += 1;
            }
        }
        let hands = self.hands.as_mut().expect(HANDS_MISSING);
        hands.test = self.ring.next(hands.test);
    }
}

impl<K, V> ReadOnlyCache<K, V> for ClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Returns `true` if the key is resident.
    ///
    /// Shadow (test) entries are tracked but not resident, so they report
    /// `false`. Never touches the reference bit.
    #[inline]
    fn contains(&self, key: &K) -> bool {
        self.index
            .get(key)
            .and_then(|&id| self.ring.get(id))
            .map(|entry| !matches!(entry.page, Page::Test))
            .unwrap_or(false)
    }

    /// Returns the number of resident entries.
    #[inline]
    fn len(&self) -> usize {
        self.count_hot + self.count_cold
    }

    /// Returns the maximum number of resident entries.
    #[inline]
    fn capacity(&self) -> usize {
        self.mem_max
    }
}

impl<K, V> CoreCache<K, V> for ClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Inserts a key-value pair.
    ///
    /// A resident key is overwritten in place (its node keeps its state and
    /// the reference bit is set) and the previous value is returned. A key
    /// in shadow re-enters directly as hot, widening the cold target. An
    /// unknown key enters as cold.
    ///
    /// # Example
    ///
    /// ```
    /// use clockpro::policy::clock_pro::ClockProCache;
    /// use clockpro::traits::CoreCache;
    ///
    /// let mut cache = ClockProCache::new(2);
    /// assert_eq!(cache.insert("a", 1), None);
    /// assert_eq!(cache.insert("a", 10), Some(1));
    /// ```
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        #[cfg(feature = "metrics")]
        {
            self.metrics.insert_calls += 1;
        }
        if let Some(&id) = self.index.get(&key) {
            let entry = self.ring.get_mut(id).expect(STALE_INDEX);
            match &mut entry.page {
                Page::Hot {
                    value: slot,
                    referenced,
                }
                | Page::Cold {
                    value: slot,
                    referenced,
                } => {
                    *referenced = true;
                    #[cfg(feature = "metrics")]
                    {
                        self.metrics.insert_updates += 1;
                    }
                    return Some(std::mem::replace(slot, value));
                }
                Page::Test => {}
            }
            // Shadow hit: the key came back while its history was still
            // tracked, so the cold partition earns more room and the key
            // re-enters as hot at the insertion point.
            if self.mem_cold < self.mem_max {
                self.mem_cold += 1;
            }
            self.meta_del(id);
            self.count_test -= 1;
            self.meta_add(
                key,
                Page::Hot {
                    value,
                    referenced: false,
                },
            );
            self.count_hot += 1;
            #[cfg(feature = "metrics")]
            {
                self.metrics.shadow_promotions += 1;
            }
            return None;
        }

        self.meta_add(
            key,
            Page::Cold {
                value,
                referenced: false,
            },
        );
        self.count_cold += 1;
        #[cfg(feature = "metrics")]
        {
            self.metrics.insert_new += 1;
        }
        None
    }

    /// Gets a reference to the value for a key, setting its reference bit.
    ///
    /// Shadow entries miss: their value is gone and only a fresh `insert`
    /// can bring the key back.
    ///
    /// # Example
    ///
    /// ```
    /// use clockpro::policy::clock_pro::ClockProCache;
    /// use clockpro::traits::CoreCache;
    ///
    /// let mut cache = ClockProCache::new(10);
    /// cache.insert("key", 42);
    /// assert_eq!(cache.get(&"key"), Some(&42));
    /// assert_eq!(cache.get(&"missing"), None);
    /// ```
    fn get(&mut self, key: &K) -> Option<&V> {
        #[cfg(feature = "metrics")]
        {
            self.metrics.get_calls += 1;
        }
        let id = match self.index.get(key) {
            Some(&id) => id,
            None => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.get_misses += 1;
                }
                return None;
            }
        };
        let entry = self.ring.get_mut(id).expect(STALE_INDEX);
        match &mut entry.page {
            Page::Hot { value, referenced } | Page::Cold { value, referenced } => {
                *referenced = true;
                #[cfg(feature = "metrics")]
                {
                    self.metrics.get_hits += 1;
                }
                Some(&*value)
            }
            Page::Test => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.get_misses += 1;
                }
                None
            }
        }
    }

    /// Clears all entries, including shadow history, and resets the cold
    /// target to the full capacity.
    fn clear(&mut self) {
        self.index.clear();
        self.ring.clear();
        self.hands = None;
        self.count_hot = 0;
        self.count_cold = 0;
        self.count_test = 0;
        self.mem_cold = self.mem_max;
    }
}

impl<K, V> std::fmt::Debug for ClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockProCache")
            .field("capacity", &self.mem_max)
            .field("hot", &self.count_hot)
            .field("cold", &self.count_cold)
            .field("test", &self.count_test)
            .field("cold_target", &self.mem_cold)
            .finish()
    }
}

/// Thread-safe wrapper around `ClockProCache` using a `parking_lot::Mutex`.
///
/// A mutex rather than a read-write lock: even lookups flip the reference
/// bit, so there is no shared read path to exploit.
#[derive(Debug)]
pub struct ConcurrentClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<ClockProCache<K, V>>,
}

impl<K, V> ConcurrentClockProCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a shared cache holding at most `capacity` resident entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(ClockProCache::new(capacity)),
        }
    }

    /// Fallible constructor: rejects a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Mutex::new(ClockProCache::try_new(capacity)?),
        })
    }

    /// Inserts a key-value pair, returning the previous value if resident.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let mut cache = self.inner.lock();
        cache.insert(key, value)
    }

    /// Runs `f` on the value for `key`, recording the access.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut cache = self.inner.lock();
        cache.get(key).map(f)
    }

    /// Returns a clone of the value for `key`, recording the access.
    pub fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.get_with(key, V::clone)
    }

    /// Returns `true` if the key is resident, without recording an access.
    pub fn contains(&self, key: &K) -> bool {
        let cache = self.inner.lock();
        cache.contains(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        let cache = self.inner.lock();
        cache.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        let cache = self.inner.lock();
        cache.is_empty()
    }

    /// Returns the maximum number of resident entries.
    pub fn capacity(&self) -> usize {
        let cache = self.inner.lock();
        cache.capacity()
    }

    /// Clears all entries and shadow history.
    pub fn clear(&self) {
        let mut cache = self.inner.lock();
        cache.clear();
    }
}
