//! # Concert Booking Testing
//!
//! Testing utilities and helpers for the concert booking client.
//!
//! This crate provides:
//! - [`MockBackend`]: a scripted [`HttpBackend`](concert_booking_core::HttpBackend)
//!   that records every request it receives
//! - Fixtures for events, seats, reservations and tokens
//! - Property-based testing strategies for seat layouts
//!
//! ## Example
//!
//! ```
//! use concert_booking_core::{decode, HttpBackend, HttpRequest, Method};
//! use concert_booking_testing::{MockBackend, MockResponse};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backend = MockBackend::new();
//! backend.on(Method::Get, "/events", MockResponse::ok(json!([])));
//!
//! let response = backend.execute(HttpRequest::get("/events")).await.unwrap();
//! let events: Vec<serde_json::Value> = decode(&response).unwrap();
//! assert!(events.is_empty());
//! assert_eq!(backend.count(Method::Get, "/events"), 1);
//! # }
//! ```

pub mod backend;
pub mod fixtures;
pub mod properties;

pub use backend::{MockBackend, MockResponse};

/// Install a `tracing` subscriber for test output.
///
/// Honors `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
