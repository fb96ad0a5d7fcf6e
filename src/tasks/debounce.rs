//! Debounce Timer Task
//!
//! One-shot background timer used to coalesce bursts of events.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Spawns a task that waits `delay` and then runs `on_fire`.
///
/// Aborting the returned handle before the delay elapses cancels the timer;
/// the debounce owner aborts the previous handle before arming a new one so
/// at most one timer is live.
///
/// # Example
/// ```ignore
/// let timer = spawn_debounce_timer(Duration::from_secs(2), move || async move {
///     batcher.flush().await;
/// });
/// // A newer event arrived:
/// timer.abort();
/// ```
pub fn spawn_debounce_timer<F, Fut>(delay: Duration, on_fire: F) -> JoinHandle<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        trace!("Debounce timer fired after {:?}", delay);
        on_fire().await;
    })
}
