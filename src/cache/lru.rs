//! LRU Cache Module
//!
//! Fixed-capacity cache that evicts the least recently used entry.

use std::collections::HashMap;
use std::hash::Hash;
use std::iter::FusedIterator;

use tracing::debug;

use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

/// Null link in the node list.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

// == LRU Cache ==
/// Capacity-bounded cache with recency-ordered eviction.
///
/// Nodes live in a `Vec` and are chained into a doubly linked list by index:
/// - Head = least recently used
/// - Tail = most recently used
///
/// A `HashMap` maps each key to its node slot, so promotion and eviction are
/// both O(1). Slots are never freed: once the cache is full, the evicted
/// head's slot is reused for the incoming entry.
///
/// The cache is single-owner. Share it across threads by wrapping it in a
/// lock.
#[derive(Debug)]
pub struct LruCache<K, V> {
    /// Maximum number of entries
    capacity: usize,
    /// Key to node slot
    index: HashMap<K, usize>,
    /// Node arena
    nodes: Vec<Node<K, V>>,
    /// Least recently used slot
    head: usize,
    /// Most recently used slot
    tail: usize,
    /// Hit/miss/eviction counters
    stats: CacheStats,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// Returns `CacheError::InvalidArgument` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidArgument(
                "LRU capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            stats: CacheStats::new(),
        })
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&slot) = self.index.get(key) else {
            self.stats.record_miss();
            return None;
        };

        self.stats.record_hit();
        self.move_to_back(slot);
        Some(&self.nodes[slot].value)
    }

    // == Put ==
    /// Inserts or overwrites `key`, making it most recently used.
    ///
    /// Returns the value previously stored under `key`. Overwriting never
    /// evicts; inserting a new key into a full cache evicts the least
    /// recently used entry first. The evicted value is dropped, not returned.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&slot) = self.index.get(&key) {
            self.move_to_back(slot);
            return Some(std::mem::replace(&mut self.nodes[slot].value, value));
        }

        let node = Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        };

        let slot = if self.nodes.len() < self.capacity {
            self.nodes.push(node);
            self.nodes.len() - 1
        } else {
            // Full: recycle the least recently used slot
            let slot = self.head;
            self.unlink(slot);
            let evicted = std::mem::replace(&mut self.nodes[slot], node);
            self.index.remove(&evicted.key);
            self.stats.record_eviction();
            debug!(capacity = self.capacity, "LRU cache evicted least recently used entry");
            slot
        };

        self.push_back(slot);
        self.index.insert(key, slot);
        None
    }

    // == Peek ==
    /// Returns the value for `key` without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&slot| &self.nodes[slot].value)
    }

    /// Checks whether `key` is stored, without touching its recency.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    // == Keys In Order ==
    /// Iterates keys from least to most recently used.
    pub fn keys_in_order(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
            remaining: self.index.len(),
        }
    }

    // == Length ==
    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }

    // == List Plumbing ==
    fn move_to_back(&mut self, slot: usize) {
        if self.tail == slot {
            return;
        }
        self.unlink(slot);
        self.push_back(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);

        if prev == NIL {
            self.head = next;
        } else {
            self.nodes[prev].next = next;
        }

        if next == NIL {
            self.tail = prev;
        } else {
            self.nodes[next].prev = prev;
        }

        self.nodes[slot].prev = NIL;
        self.nodes[slot].next = NIL;
    }

    fn push_back(&mut self, slot: usize) {
        self.nodes[slot].prev = self.tail;
        self.nodes[slot].next = NIL;

        if self.tail == NIL {
            self.head = slot;
        } else {
            self.nodes[self.tail].next = slot;
        }
        self.tail = slot;
    }
}

// == Iterator ==
/// Iterator over `(key, value)` pairs, least recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
