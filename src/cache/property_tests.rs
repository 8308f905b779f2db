//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check both caches against simple reference models.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{ExpiringCache, LruCache, MockClock};

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,32}"
}

#[derive(Debug, Clone)]
enum LruOp {
    Put { key: String, value: String },
    Get { key: String },
}

fn lru_op_strategy() -> impl Strategy<Value = LruOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| LruOp::Put { key, value }),
        key_strategy().prop_map(|key| LruOp::Get { key }),
    ]
}

#[derive(Debug, Clone)]
enum TtlOp {
    Put { key: String, value: String, ttl: Duration },
    Get { key: String },
    Remove { key: String },
    Advance { ms: u64 },
    Sweep,
}

/// Mostly short TTLs, with the occasional one beyond what `Instant` can hold
fn ttl_strategy() -> impl Strategy<Value = Duration> {
    prop_oneof![
        8 => (0u64..200).prop_map(Duration::from_millis),
        1 => (u64::MAX / 2..=u64::MAX).prop_map(Duration::from_millis),
        1 => Just(Duration::MAX),
    ]
}

fn ttl_op_strategy() -> impl Strategy<Value = TtlOp> {
    prop_oneof![
        (key_strategy(), value_strategy(), ttl_strategy())
            .prop_map(|(key, value, ttl)| TtlOp::Put { key, value, ttl }),
        key_strategy().prop_map(|key| TtlOp::Get { key }),
        key_strategy().prop_map(|key| TtlOp::Remove { key }),
        (1u64..100).prop_map(|ms| TtlOp::Advance { ms }),
        Just(TtlOp::Sweep),
    ]
}

// == Reference Models ==
/// Recency list (least recent first) plus values.
#[derive(Default)]
struct LruModel {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl LruModel {
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push(key.to_string());
    }

    fn put(&mut self, capacity: usize, key: String, value: String) -> Option<String> {
        if !self.values.contains_key(&key) && self.values.len() == capacity {
            let oldest = self.order.remove(0);
            self.values.remove(&oldest);
        }
        self.touch(&key);
        self.values.insert(key, value)
    }

    fn get(&mut self, key: &str) -> Option<String> {
        let value = self.values.get(key).cloned();
        if value.is_some() {
            self.touch(key);
        }
        value
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every put/get matches the reference model: same return values, same
    // recency order, and the size bound holds after each call.
    #[test]
    fn prop_lru_matches_model(
        capacity in 1usize..6,
        ops in prop::collection::vec(lru_op_strategy(), 1..80)
    ) {
        let mut cache = LruCache::new(capacity).unwrap();
        let mut model = LruModel::default();

        for op in ops {
            match op {
                LruOp::Put { key, value } => {
                    let expected = model.put(capacity, key.clone(), value.clone());
                    prop_assert_eq!(cache.put(key, value), expected);
                }
                LruOp::Get { key } => {
                    let expected = model.get(&key);
                    prop_assert_eq!(cache.get(&key).cloned(), expected);
                }
            }

            prop_assert!(cache.len() <= capacity);
            let order: Vec<String> = cache.keys_in_order().cloned().collect();
            prop_assert_eq!(&order, &model.order);
        }
    }

    // Filling a cache and adding one more distinct key evicts exactly the
    // key that was touched least recently.
    #[test]
    fn prop_lru_evicts_least_recently_touched(
        keys in prop::collection::hash_set(key_strategy(), 2..8),
        touch_index in 0usize..8,
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let mut cache = LruCache::new(capacity).unwrap();

        for key in &keys {
            cache.put(key.clone(), format!("value_{}", key));
        }

        // Touching a key takes it out of eviction range
        let touched = keys[touch_index % capacity].clone();
        cache.get(&touched);
        let expected_evicted = keys.iter().find(|k| **k != touched).unwrap().clone();

        cache.put("new-key".to_string(), "new".to_string());

        prop_assert_eq!(cache.len(), capacity);
        prop_assert!(!cache.contains(&expected_evicted));
        prop_assert!(cache.contains(&touched));
        prop_assert!(cache.contains(&"new-key".to_string()));
    }

    // A put followed by a get returns the stored value for both caches.
    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let mut lru = LruCache::new(4).unwrap();
        lru.put(key.clone(), value.clone());
        prop_assert_eq!(lru.get(&key), Some(&value));

        let ttl = ExpiringCache::with_clock(TEST_DEFAULT_TTL, false, MockClock::new()).unwrap();
        ttl.put(key.clone(), value.clone());
        prop_assert_eq!(ttl.get(&key), Some(value));
    }

    // Model check of the expiring cache under a mock clock: get never
    // returns an expired value, and a sweep keeps exactly the live entries.
    #[test]
    fn prop_expiring_matches_model(ops in prop::collection::vec(ttl_op_strategy(), 1..80)) {
        let clock = MockClock::new();
        let cache = ExpiringCache::with_clock(TEST_DEFAULT_TTL, false, clock.clone()).unwrap();
        // key -> (value, deadline as elapsed time; None never expires)
        let mut model: HashMap<String, (String, Option<Duration>)> = HashMap::new();
        let mut now = Duration::ZERO;
        let live = |now: Duration, deadline: &Option<Duration>| deadline.map_or(true, |d| now < d);

        for op in ops {
            match op {
                TtlOp::Put { key, value, ttl } => {
                    cache.put_with_ttl(key.clone(), value.clone(), ttl);
                    model.insert(key, (value, now.checked_add(ttl)));
                }
                TtlOp::Get { key } => {
                    let expected = match model.get(&key) {
                        Some((value, deadline)) if live(now, deadline) => Some(value.clone()),
                        Some(_) => {
                            model.remove(&key);
                            None
                        }
                        None => None,
                    };
                    prop_assert_eq!(cache.get(&key), expected);
                }
                TtlOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key), model.remove(&key).is_some());
                }
                TtlOp::Advance { ms } => {
                    clock.advance_millis(ms);
                    now += Duration::from_millis(ms);
                }
                TtlOp::Sweep => {
                    let before = model.len();
                    model.retain(|_, (_, deadline)| live(now, &*deadline));
                    prop_assert_eq!(cache.remove_expired_entries(), before - model.len());
                }
            }

            // Size counts stored entries, live or not
            prop_assert_eq!(cache.len(), model.len());
        }
    }

    // TTLs near the top of the Duration range store entries that stay live,
    // whether passed per entry or as the default.
    #[test]
    fn prop_huge_ttl_stays_live(
        key in key_strategy(),
        ttl in prop_oneof![
            (u64::MAX / 2..=u64::MAX).prop_map(Duration::from_millis),
            (u64::MAX / 2..=u64::MAX).prop_map(Duration::from_secs),
            Just(Duration::MAX),
        ],
        advance_secs in 0u64..1_000_000,
    ) {
        let clock = MockClock::new();
        let per_entry = ExpiringCache::with_clock(TEST_DEFAULT_TTL, false, clock.clone()).unwrap();
        let by_default = ExpiringCache::with_clock(ttl, false, clock.clone()).unwrap();

        per_entry.put_with_ttl(key.clone(), "v".to_string(), ttl);
        by_default.put(key.clone(), "v".to_string());
        clock.advance(Duration::from_secs(advance_secs));

        prop_assert_eq!(per_entry.get(&key), Some("v".to_string()));
        prop_assert_eq!(by_default.get(&key), Some("v".to_string()));
        prop_assert_eq!(per_entry.remove_expired_entries(), 0);
        prop_assert_eq!(by_default.remove_expired_entries(), 0);
    }

    // Overwriting replaces the deadline: a long TTL followed by a short one
    // expires on the short schedule.
    #[test]
    fn prop_overwrite_resets_deadline(
        key in key_strategy(),
        first_ttl in 100u64..1000,
        second_ttl in 1u64..100,
    ) {
        let clock = MockClock::new();
        let cache = ExpiringCache::with_clock(TEST_DEFAULT_TTL, false, clock.clone()).unwrap();

        cache.put_with_ttl(key.clone(), "first".to_string(), Duration::from_millis(first_ttl));
        cache.put_with_ttl(key.clone(), "second".to_string(), Duration::from_millis(second_ttl));

        clock.advance_millis(second_ttl);
        prop_assert_eq!(cache.get(&key), None);
    }
}

// == Property Test for Error Response Format ==
// This tests the CacheError -> HTTP response conversion

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error variant becomes a JSON body with an "error" string field.
    #[test]
    fn prop_error_response_format(error_msg in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::CacheError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::InvalidArgument(error_msg.clone()),
            CacheError::InvalidReference(error_msg.clone()),
            CacheError::NotFound(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
            CacheError::SweeperUnavailable(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes)
                .expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
// Shared ExpiringCache hammered from many tasks at once

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent puts, gets and removes never observe a value that was not
    // written for that key, and the cache ends in a consistent state.
    #[test]
    fn prop_concurrent_operation_correctness(
        ops in prop::collection::vec(ttl_op_strategy(), 10..60)
    ) {
        let cache = Arc::new(
            ExpiringCache::<String, String>::new(TEST_DEFAULT_TTL, false).unwrap(),
        );

        let results: Vec<Result<(), String>> = tokio_test::block_on(async {
            let mut handles = Vec::new();

            for op in ops {
                let cache = Arc::clone(&cache);
                handles.push(tokio::spawn(async move {
                    match op {
                        TtlOp::Put { key, ttl, .. } => {
                            // Values always encode their key
                            let value = format!("value_of_{}", key);
                            cache.put_with_ttl(key, value, ttl.saturating_add(Duration::from_secs(60)));
                        }
                        TtlOp::Get { key } => {
                            if let Some(value) = cache.get(&key) {
                                if value != format!("value_of_{}", key) {
                                    return Err(format!("key '{}' returned '{}'", key, value));
                                }
                            }
                        }
                        TtlOp::Remove { key } => {
                            cache.remove(&key);
                        }
                        TtlOp::Advance { .. } | TtlOp::Sweep => {
                            cache.remove_expired_entries();
                        }
                    }
                    Ok(())
                }));
            }

            let mut results = Vec::new();
            for handle in handles {
                results.push(handle.await.map_err(|e| e.to_string()).and_then(|r| r));
            }
            results
        });

        for result in results {
            prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.total_entries, cache.len());
        prop_assert!(stats.hit_rate() >= 0.0 && stats.hit_rate() <= 1.0);
    }
}
