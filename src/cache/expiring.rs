//! Expiring Cache Module
//!
//! Thread-safe TTL cache combining lazy expiration on access with an
//! optional background sweep.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, sweep_interval_for, Sweep, SweeperHandle};

// == Store ==
/// Entry map and counters, guarded by one mutex and shared with the sweeper.
struct Store<K, V, C> {
    state: Mutex<StoreState<K, V>>,
    clock: C,
}

struct StoreState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    stats: CacheStats,
}

impl<K, V, C> Store<K, V, C>
where
    K: Hash + Eq,
    C: Clock,
{
    fn new(clock: C) -> Self {
        Self {
            state: Mutex::new(StoreState {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            clock,
        }
    }

    /// Drops every entry whose deadline is at or before now.
    fn remove_expired(&self) -> usize {
        let now = self.clock.now();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - state.entries.len();

        state.stats.record_expirations(removed);
        state.stats.set_total_entries(state.entries.len());
        removed
    }
}

impl<K, V, C> Sweep for Store<K, V, C>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Send + Sync + 'static,
    C: Clock,
{
    fn sweep(&self) -> usize {
        self.remove_expired()
    }
}

// == Expiring Cache ==
/// Key-value cache where every entry expires after a time-to-live.
///
/// Expired entries are never returned. They are removed lazily by [`get`],
/// in bulk by [`remove_expired_entries`], and periodically by a background
/// sweeper when one is enabled at construction. [`len`] counts stored
/// entries, which may include expired ones not yet removed.
///
/// All operations take `&self`; the cache can be shared behind an `Arc`.
///
/// [`get`]: ExpiringCache::get
/// [`remove_expired_entries`]: ExpiringCache::remove_expired_entries
/// [`len`]: ExpiringCache::len
pub struct ExpiringCache<K, V, C = SystemClock> {
    store: Arc<Store<K, V, C>>,
    default_ttl: Duration,
    sweep_interval: Duration,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl<K, V> ExpiringCache<K, V, SystemClock>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache using the system clock.
    ///
    /// # Arguments
    /// * `default_ttl` - Lifetime of entries stored with [`put`](Self::put)
    /// * `enable_background_sweep` - Start a sweeper on the current Tokio runtime
    ///
    /// # Errors
    /// `InvalidArgument` for a zero TTL, `SweeperUnavailable` if a sweep is
    /// requested outside a Tokio runtime.
    pub fn new(default_ttl: Duration, enable_background_sweep: bool) -> Result<Self> {
        Self::with_clock(default_ttl, enable_background_sweep, SystemClock)
    }
}

impl<K, V, C> ExpiringCache<K, V, C>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    C: Clock,
{
    /// Creates a cache reading time from `clock`.
    pub fn with_clock(
        default_ttl: Duration,
        enable_background_sweep: bool,
        clock: C,
    ) -> Result<Self> {
        if default_ttl.is_zero() {
            return Err(CacheError::InvalidArgument(
                "default TTL must be greater than zero".to_string(),
            ));
        }

        let store = Arc::new(Store::new(clock));
        let sweep_interval = sweep_interval_for(default_ttl);

        let sweeper = if enable_background_sweep {
            let runtime = Handle::try_current().map_err(|e| {
                CacheError::SweeperUnavailable(format!(
                    "background sweep requires a Tokio runtime: {}",
                    e
                ))
            })?;
            Some(spawn_sweeper(&runtime, Arc::downgrade(&store), sweep_interval))
        } else {
            None
        };

        Ok(Self {
            store,
            default_ttl,
            sweep_interval,
            sweeper: Mutex::new(sweeper),
        })
    }

    // == Put ==
    /// Stores `value` under `key` for the default TTL.
    pub fn put(&self, key: K, value: V) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Stores `value` under `key` for `ttl`.
    ///
    /// An existing entry is replaced outright, value and deadline both. A
    /// zero `ttl` is accepted; the entry is already expired and the next
    /// access misses. A `ttl` past the clock's range stores an entry that
    /// never expires.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry::new(value, self.store.clock.now(), ttl);

        let mut state = self.store.state.lock();
        state.entries.insert(key, entry);
        let count = state.entries.len();
        state.stats.set_total_entries(count);
    }

    // == Get ==
    /// Returns a clone of the live value under `key`.
    ///
    /// An expired entry is removed on the spot and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.store.clock.now();
        let mut guard = self.store.state.lock();
        let state = &mut *guard;

        let Some(entry) = state.entries.get(key) else {
            state.stats.record_miss();
            return None;
        };

        if !entry.is_expired_at(now) {
            let value = entry.value.clone();
            state.stats.record_hit();
            return Some(value);
        }

        state.entries.remove(key);
        state.stats.record_expirations(1);
        state.stats.record_miss();
        state.stats.set_total_entries(state.entries.len());
        None
    }

    /// Checks whether `key` holds a live entry. Never mutates the store.
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.store.clock.now();
        self.store
            .state
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Remaining lifetime of the live entry under `key`.
    pub fn ttl_remaining(&self, key: &K) -> Option<Duration> {
        let now = self.store.clock.now();
        self.store
            .state
            .lock()
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.ttl_remaining_at(now))
    }

    // == Remove ==
    /// Deletes `key` whether or not it has expired.
    ///
    /// Returns false if nothing was stored under `key`.
    pub fn remove(&self, key: &K) -> bool {
        let mut state = self.store.state.lock();
        let removed = state.entries.remove(key).is_some();
        let count = state.entries.len();
        state.stats.set_total_entries(count);
        removed
    }

    /// Deletes every entry.
    pub fn clear(&self) {
        let mut state = self.store.state.lock();
        state.entries.clear();
        state.stats.set_total_entries(0);
    }

    // == Cleanup Expired ==
    /// Removes all entries expired as of now.
    ///
    /// Returns the number of entries removed. The background sweeper runs
    /// the same pass on every tick.
    pub fn remove_expired_entries(&self) -> usize {
        self.store.remove_expired()
    }

    // == Length ==
    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.store.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.store.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }
}

impl<K, V, C> ExpiringCache<K, V, C> {
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Interval the background sweeper runs at, whether or not it is enabled.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Returns true while a background sweeper is attached and running.
    pub fn is_sweeping(&self) -> bool {
        match &*self.sweeper.lock() {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }

    // == Shutdown ==
    /// Stops the background sweeper.
    ///
    /// Safe to call any number of times, and on a cache created without a
    /// sweeper. Returns without waiting for the task to exit.
    pub fn shutdown_cleanup(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.shutdown();
        }
    }
}

impl<K, V, C> Drop for ExpiringCache<K, V, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.shutdown();
        }
    }
}
