//! Typed wrappers over the booking API endpoints.
//!
//! Each wrapper is a stateless namespace whose functions take the
//! [`TransportClient`](crate::TransportClient) to send through, so every call
//! inherits bearer attachment and the refresh-and-retry policy.

pub mod events;
pub mod payments;
pub mod reservations;
pub mod users;

pub use events::EventsApi;
pub use payments::PaymentsApi;
pub use reservations::{CreateReservation, ReservationsApi};
pub use users::{RegistrationForm, UsersApi};
