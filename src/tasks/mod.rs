//! Background Tasks Module
//!
//! Contains background tasks owned by the caches.
//!
//! # Tasks
//! - Expiry sweeper: removes expired entries at a TTL-derived interval

mod sweeper;

pub use sweeper::{
    spawn_sweeper, sweep_interval_for, Sweep, SweeperHandle, MAX_SWEEP_INTERVAL,
    MIN_SWEEP_INTERVAL,
};
