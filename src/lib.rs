//! Mini Cache - In-memory caches with LRU eviction and TTL expiration
//!
//! - [`cache::LruCache`]: capacity-bounded, evicts the least recently used entry
//! - [`cache::ExpiringCache`]: time-bounded, lazy expiry plus a background sweeper
//!
//! The binary serves an `ExpiringCache<String, String>` over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ExpiringCache, LruCache};
pub use config::Config;
pub use error::{CacheError, Result};
