//! Expiry Sweep Task
//!
//! Background task that periodically drops expired windows and cached pages
//! that nobody has read since they expired. Reads already expire lazily;
//! this only bounds memory held by idle keys.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

/// In-memory state that can drop its expired entries.
///
/// Implementations must not block for long: the sweep runs on the request
/// runtime.
pub trait Sweep: Send + Sync {
    /// Label used in logs.
    fn name(&self) -> &'static str;

    /// Removes expired entries, returning how many were removed.
    fn sweep_expired(&self) -> usize;
}

/// Spawns a task that sweeps every store in `targets` each `interval_secs`.
///
/// The returned handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let windows = Arc::new(MemoryWindowStore::new());
/// let handle = spawn_sweep_task(vec![windows.clone() as Arc<dyn Sweep>], 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_sweep_task(targets: Vec<Arc<dyn Sweep>>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep over {} store(s) every {} seconds",
            targets.len(),
            interval.as_secs()
        );

        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            for target in &targets {
                let removed = target.sweep_expired();
                if removed > 0 {
                    info!("Expiry sweep: removed {} expired {} entries", removed, target.name());
                } else {
                    debug!("Expiry sweep: no expired {} entries", target.name());
                }
            }
        }
    })
}
