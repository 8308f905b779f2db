//! Cache Module
//!
//! Provides an LRU cache bounded by capacity and an expiring cache bounded
//! by time-to-live.

mod clock;
mod entry;
mod expiring;
mod lru;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use entry::CacheEntry;
pub use expiring::ExpiringCache;
pub use lru::{Iter, LruCache};
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes at the HTTP boundary
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes at the HTTP boundary
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
