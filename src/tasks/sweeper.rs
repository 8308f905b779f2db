//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fastest allowed sweep interval.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(100);

/// Slowest allowed sweep interval.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_millis(1000);

// == Sweep Target ==
/// Something the sweeper can ask to drop its expired entries.
pub trait Sweep: Send + Sync + 'static {
    /// Removes expired entries and returns how many were removed.
    fn sweep(&self) -> usize;
}

/// Derives the sweep interval from a default TTL.
///
/// Half the TTL, clamped to `[MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL]`.
pub fn sweep_interval_for(default_ttl: Duration) -> Duration {
    (default_ttl / 2).clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL)
}

// == Sweeper Handle ==
/// Owned handle to a running sweeper.
///
/// Dropping the handle does not stop the task; call [`SweeperHandle::shutdown`].
/// The task also exits on its own once its target has been dropped.
#[derive(Debug)]
pub struct SweeperHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the task to stop. Does not wait for it.
    pub fn shutdown(self) {
        self.cancel.cancel();
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that sweeps `target` every `interval`.
///
/// The task holds only a weak reference, so it never keeps the target
/// alive. A panic inside a sweep is caught and logged; the task carries on
/// with the next tick.
///
/// # Arguments
/// * `runtime` - Tokio runtime to spawn onto
/// * `target` - Weak reference to the store being swept
/// * `interval` - Time between sweeps
///
/// # Example
/// ```ignore
/// let handle = spawn_sweeper(&Handle::current(), Arc::downgrade(&store), Duration::from_millis(500));
/// // Later, during shutdown:
/// handle.shutdown();
/// ```
pub fn spawn_sweeper<S: Sweep>(
    runtime: &Handle,
    target: Weak<S>,
    interval: Duration,
) -> SweeperHandle {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = runtime.spawn(async move {
        info!(
            "Starting expiry sweeper with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Expiry sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(target) = target.upgrade() else {
                        debug!("Sweep target dropped, sweeper exiting");
                        break;
                    };

                    match panic::catch_unwind(AssertUnwindSafe(|| target.sweep())) {
                        Ok(0) => debug!("Expiry sweep: no expired entries found"),
                        Ok(removed) => info!("Expiry sweep: removed {} expired entries", removed),
                        Err(_) => warn!("Expiry sweep failed, skipping until next tick"),
                    }
                }
            }
        }
    });

    SweeperHandle { cancel, task }
}
