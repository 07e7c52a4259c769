//! Single-flight coordination for idempotent async operations.
//!
//! When several tasks ask for the same operation at once, only the first one
//! starts it. Everyone else joins the in-flight execution and receives a
//! clone of its result. Once the execution completes the slot is cleared and
//! the next caller starts a fresh one.
//!
//! # Example
//!
//! ```rust
//! use concert_booking_runtime::single_flight::SingleFlight;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! # async fn example() {
//! let flight = Arc::new(SingleFlight::<u32>::new());
//! let calls = Arc::new(AtomicUsize::new(0));
//!
//! let run = |flight: Arc<SingleFlight<u32>>, calls: Arc<AtomicUsize>| async move {
//!     flight
//!         .run(move || async move {
//!             calls.fetch_add(1, Ordering::SeqCst);
//!             tokio::task::yield_now().await;
//!             42
//!         })
//!         .await
//! };
//!
//! let (a, b) = tokio::join!(
//!     run(Arc::clone(&flight), Arc::clone(&calls)),
//!     run(Arc::clone(&flight), Arc::clone(&calls)),
//! );
//!
//! assert_eq!((a, b), (42, 42));
//! assert_eq!(calls.load(Ordering::SeqCst), 1);
//! # }
//! ```

use futures::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

type Flight<T> = Shared<BoxFuture<'static, T>>;

/// Shares one in-flight execution of an operation among concurrent callers.
///
/// # Guarantees
///
/// - While an execution is pending, every caller of [`SingleFlight::run`]
///   awaits that execution; the `start` closure of joiners is never invoked
/// - All callers that joined the same execution observe the same result
/// - A completed execution is never handed to a later caller, even if every
///   original awaiter was dropped before clearing the slot
pub struct SingleFlight<T> {
    inflight: Mutex<Option<Flight<T>>>,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an idle single-flight slot
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inflight: Mutex::new(None),
        }
    }

    /// Run `start()` unless an execution is already in flight, in which case
    /// join it.
    pub async fn run<F, Fut>(&self, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let flight = {
            let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(pending) if pending.peek().is_none() => {
                    tracing::debug!("Joining in-flight execution");
                    pending.clone()
                }
                _ => {
                    let flight = start().boxed().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        let result = flight.clone().await;

        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }

        result
    }

    /// Whether an execution is currently pending
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|pending| pending.peek().is_none())
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SingleFlight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let busy = self
            .inflight
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("SingleFlight").field("occupied", &busy).finish()
    }
}
