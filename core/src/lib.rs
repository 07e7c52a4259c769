//! # Concert Booking Core
//!
//! Core types for the concert booking client.
//!
//! This crate holds everything the orchestration crates agree on and nothing
//! that performs I/O on its own:
//!
//! - **Types**: identifiers, seats, events, reservations, session tokens
//! - **Errors**: the [`BookingError`] taxonomy every operation returns
//! - **Envelope**: the `{ success, data, message }` wire codec and the
//!   status/code based error classification
//! - **Environment**: the [`HttpBackend`] trait through which every request
//!   leaves the process
//!
//! ## Architecture Principles
//!
//! - The remote service owns seat and reservation state; the client mirrors it
//! - Dependencies are injected as trait objects, never reached through globals
//! - Errors are classified once, at the wire boundary, and propagated with `?`
//!
//! ## Example
//!
//! ```
//! use concert_booking_core::{ReservationStatus, SeatStatus};
//!
//! assert!(ReservationStatus::Expired.is_terminal());
//! assert!(!ReservationStatus::Pending.is_terminal());
//! assert!(SeatStatus::Available.is_selectable());
//! ```

pub mod envelope;
pub mod environment;
pub mod error;
pub mod types;

pub use envelope::{ApiEnvelope, ErrorBody, classify, decode};
pub use environment::{HttpBackend, HttpRequest, HttpResponse, Method};
pub use error::{AuthError, BookingError, FieldViolation, Result};
pub use types::{
    Credentials, Event, EventId, EventStatus, EventSummary, PaymentId, PaymentReceipt,
    Reservation, ReservationId, ReservationStatus, Seat, SeatId, SeatStatus, SeatSummary,
    SessionTokens, User, UserId, UserSummary,
};

// Re-export commonly used types
pub use chrono::NaiveDateTime;
