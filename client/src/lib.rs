//! # Concert Booking Client
//!
//! Orchestration core of the concert booking client: everything between a
//! user's intent ("hold seat B2", "pay for it") and the booking service.
//!
//! ## Components
//!
//! - **[`TransportClient`]**: attaches the session's bearer token and
//!   recovers once from a 401 through a shared token refresh
//! - **[`SeatCatalog`]**: seat snapshot of one event with a single local
//!   selection that only ever points at an `AVAILABLE` seat
//! - **[`ReservationLifecycle`]**: create, poll, confirm and cancel one
//!   reservation, publishing a [`ReservationView`] to observers
//! - **[`api`]**: typed endpoint wrappers
//! - **[`ClientConfig`]** and **[`ReqwestBackend`]**: environment-driven
//!   wiring for production use
//!
//! ## Example
//!
//! ```no_run
//! use concert_booking_auth::SessionManager;
//! use concert_booking_client::{ClientConfig, ReqwestBackend, SeatCatalog, TransportClient};
//! use concert_booking_core::{Credentials, EventId, HttpBackend, SeatId};
//! use std::sync::Arc;
//!
//! # async fn run() -> concert_booking_core::Result<()> {
//! let config = ClientConfig::from_env();
//! let backend: Arc<dyn HttpBackend> = Arc::new(ReqwestBackend::from_config(&config)?);
//! let session = SessionManager::new(config.token_store(), Arc::clone(&backend));
//! session.login(&Credentials::new("kim@example.com", "secret12!")).await?;
//!
//! let transport = TransportClient::new(session, backend);
//! let mut catalog = SeatCatalog::load(transport, EventId::new(1)).await?;
//! catalog.click(SeatId::new(5));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod reservation;
pub mod seats;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use api::{
    CreateReservation, EventsApi, PaymentsApi, RegistrationForm, ReservationsApi, UsersApi,
};
pub use backend::ReqwestBackend;
pub use config::{ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_POLL_INTERVAL};
pub use reservation::{
    CANCEL_FAILED_MESSAGE, CONFIRM_FAILED_MESSAGE, ReservationLifecycle, ReservationView,
};
pub use seats::{SeatCatalog, SeatMap, SeatRow};
pub use transport::TransportClient;
