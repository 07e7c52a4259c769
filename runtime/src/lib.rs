//! # Concert Booking Runtime
//!
//! Async coordination primitives used by the booking client.
//!
//! ## Core Components
//!
//! - **`SingleFlight`**: collapses concurrent calls of one operation into a
//!   single execution whose result every caller shares (token refresh)
//! - **`PollHandle`**: a cancellable fixed-interval background task
//!   (reservation status polling)
//!
//! ## Example
//!
//! ```ignore
//! use concert_booking_runtime::{spawn_poller, SingleFlight};
//!
//! let refresh = SingleFlight::new();
//! let tokens = refresh.run(|| exchange_refresh_token()).await;
//!
//! let handle = spawn_poller("reservation", Duration::from_secs(60), || poll_once());
//! handle.stop();
//! ```

/// Shared single execution of concurrent requests
pub mod single_flight;

/// Cancellable interval polling
pub mod poller;

pub use poller::{MIN_POLL_PERIOD, PollHandle, spawn_poller};
pub use single_flight::SingleFlight;
