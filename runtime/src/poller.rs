//! Cancellable fixed-interval polling.
//!
//! [`spawn_poller`] runs an async tick function on a fixed interval in a
//! background task and returns a [`PollHandle`]. The task ends when the tick
//! returns [`ControlFlow::Break`], when [`PollHandle::stop`] is called, or when
//! the handle is dropped. No tick runs after the handle is gone.
//!
//! # Example
//!
//! ```rust
//! use concert_booking_runtime::poller::spawn_poller;
//! use std::ops::ControlFlow;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let mut remaining = 3;
//! let handle = spawn_poller("countdown", Duration::from_secs(1), move || {
//!     remaining -= 1;
//!     let done = remaining == 0;
//!     async move {
//!         if done { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
//!     }
//! });
//!
//! handle.finished().await;
//! # }
//! ```

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Shortest period [`spawn_poller`] will tick at.
pub const MIN_POLL_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a background polling task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct PollHandle {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Stop polling now.
    ///
    /// An in-progress tick is cancelled at its next suspension point; no
    /// further tick starts.
    pub fn stop(mut self) {
        self.abort();
    }

    /// Whether the task has ended (by itself or by being stopped)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the task to end on its own.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    tracing::error!(poller = self.name, "Poller task panicked");
                }
            }
        }
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                tracing::debug!(poller = self.name, "Stopping poller");
            }
            task.abort();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Spawn a task that calls `tick` every `period`, starting one period from now.
///
/// Ticks never overlap: a slow tick delays the next one rather than
/// bunching missed ticks together. A `period` below [`MIN_POLL_PERIOD`]
/// is raised to it.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_poller<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    if period < MIN_POLL_PERIOD {
        tracing::warn!(poller = name, period_ms = period.as_millis(), "Poll period too short, clamping");
    }
    let period = period.max(MIN_POLL_PERIOD);
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(poller = name, period_ms = period.as_millis(), "Poller started");
        loop {
            interval.tick().await;
            if tick().await.is_break() {
                break;
            }
        }
        tracing::debug!(poller = name, "Poller finished");
    });

    PollHandle {
        name,
        task: Some(task),
    }
}
