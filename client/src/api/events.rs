//! Event browsing endpoints.

use crate::transport::TransportClient;
use concert_booking_core::{Event, EventId, Result, Seat};

/// `/events` endpoints
#[derive(Debug, Clone, Copy)]
pub struct EventsApi;

impl EventsApi {
    /// `GET /events`
    ///
    /// # Errors
    ///
    /// Any transport or classification error.
    pub async fn list(transport: &TransportClient) -> Result<Vec<Event>> {
        transport.get("/events").await
    }

    /// `GET /events/{id}`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::NotFound`] for an unknown id, or
    /// any transport error.
    pub async fn get(transport: &TransportClient, id: EventId) -> Result<Event> {
        transport.get(&format!("/events/{id}")).await
    }

    /// `GET /events/{id}/seats`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::NotFound`] for an unknown id, or
    /// any transport error.
    pub async fn seats(transport: &TransportClient, id: EventId) -> Result<Vec<Seat>> {
        transport.get(&format!("/events/{id}/seats")).await
    }
}
