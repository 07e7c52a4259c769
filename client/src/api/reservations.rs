//! Reservation endpoints.
//!
//! Prefer [`ReservationLifecycle`](crate::ReservationLifecycle), which adds
//! local precondition checks, polling and seat reconciliation on top.

use crate::transport::TransportClient;
use concert_booking_core::{EventId, PaymentId, Reservation, ReservationId, Result, SeatId, UserId};
use serde::Serialize;

/// Body of `POST /reservations`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    /// Event to book
    pub event_id: EventId,
    /// Seat to hold
    pub seat_id: SeatId,
    /// Booking user
    pub user_id: UserId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmReservation<'a> {
    payment_id: &'a PaymentId,
}

/// `/reservations` endpoints
#[derive(Debug, Clone, Copy)]
pub struct ReservationsApi;

impl ReservationsApi {
    /// `POST /reservations`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::Conflict`] if the seat is no
    /// longer available, or any transport error.
    pub async fn create(transport: &TransportClient, request: &CreateReservation) -> Result<Reservation> {
        transport.post("/reservations", request).await
    }

    /// `GET /reservations/{id}`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::NotFound`] for an unknown id, or
    /// any transport error.
    pub async fn get(transport: &TransportClient, id: ReservationId) -> Result<Reservation> {
        transport.get(&format!("/reservations/{id}")).await
    }

    /// `POST /reservations/{id}/confirm`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::Conflict`] if the reservation is
    /// not pending, [`concert_booking_core::BookingError::PaymentDeclined`]
    /// if payment fails, or any transport error.
    pub async fn confirm(
        transport: &TransportClient,
        id: ReservationId,
        payment_id: &PaymentId,
    ) -> Result<Reservation> {
        transport
            .post(
                &format!("/reservations/{id}/confirm"),
                &ConfirmReservation { payment_id },
            )
            .await
    }

    /// `DELETE /reservations/{id}/cancel`
    ///
    /// # Errors
    ///
    /// [`concert_booking_core::BookingError::Conflict`] if the reservation can
    /// no longer be cancelled, or any transport error.
    pub async fn cancel(transport: &TransportClient, id: ReservationId) -> Result<Reservation> {
        transport.delete(&format!("/reservations/{id}/cancel")).await
    }
}
