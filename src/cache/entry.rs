//! Cache Entry Module
//!
//! Defines the value-plus-deadline pair stored by the expiring cache.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value together with the instant it stops being visible.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Instant at which the entry expires; `None` if the deadline lies past
    /// what `Instant` can represent
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` after `now`.
    ///
    /// A zero `ttl` yields an entry that is already expired. A `ttl` too
    /// large to add to `now` yields an entry that never expires.
    pub fn new(value: V, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now.checked_add(ttl),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is expired at `now`.
    ///
    /// Boundary condition: the entry is expired once `now >= expires_at`, so
    /// it is live only strictly before its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    // == Time To Live ==
    /// Remaining lifetime at `now`, `Duration::ZERO` once expired and
    /// `Duration::MAX` for an entry without a deadline.
    pub fn ttl_remaining_at(&self, now: Instant) -> Duration {
        match self.expires_at {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => Duration::MAX,
        }
    }
}
