//! Test fixtures.
//!
//! Builders return domain values; [`to_json`] turns any of them into the wire
//! form ready to be handed to [`MockResponse::ok`](crate::MockResponse::ok).

use chrono::{NaiveDate, NaiveDateTime};
use concert_booking_core::{
    Event, EventId, EventStatus, EventSummary, Reservation, ReservationId, ReservationStatus,
    Seat, SeatId, SeatStatus, SeatSummary, SessionTokens, UserId, UserSummary,
};
use serde::Serialize;
use serde_json::Value;

/// Fixed timestamp for deterministic fixtures (2025-06-01 19:00:00).
///
/// # Panics
///
/// Never in practice; the date is hard-coded.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|d| d.and_hms_opt(19, 0, 0))
        .expect("hard-coded timestamp should always be valid")
}

/// Serialize a fixture into its wire form.
///
/// # Panics
///
/// Panics if `value` cannot be represented as JSON.
#[must_use]
#[allow(clippy::expect_used)]
pub fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("fixture should serialize")
}

/// Token pair `access-{n}` / `refresh-{n}`.
#[must_use]
pub fn tokens(n: u32) -> SessionTokens {
    SessionTokens::new(format!("access-{n}"), format!("refresh-{n}"))
}

/// An open event with `seats` seats, all available.
#[must_use]
pub fn event(id: i64, seats: u32) -> Event {
    Event {
        id: EventId::new(id),
        title: format!("Concert {id}"),
        description: String::new(),
        venue: "Main Hall".to_string(),
        event_date_time: test_time(),
        total_seats: seats,
        available_seats: seats,
        price: 50_000,
        status: EventStatus::Open,
    }
}

/// One seat of event `event_id`.
#[must_use]
pub fn seat(id: i64, event_id: i64, row: &str, number: u32, status: SeatStatus) -> Seat {
    Seat {
        id: SeatId::new(id),
        event_id: EventId::new(event_id),
        row: row.to_string(),
        number: number.to_string(),
        display: format!("{row}{number}"),
        price: 50_000,
        status,
        temporarily_reserved_at: matches!(status, SeatStatus::TemporarilyReserved)
            .then(test_time),
        expired: false,
    }
}

/// A `rows` x `per_row` grid of available seats with ids counting from 1.
///
/// Rows are labelled `A`, `B`, ...
#[must_use]
pub fn seat_grid(event_id: i64, rows: u8, per_row: u32) -> Vec<Seat> {
    let mut seats = Vec::new();
    let mut id = 0;
    for r in 0..rows {
        let row = char::from(b'A' + r).to_string();
        for number in 1..=per_row {
            id += 1;
            seats.push(seat(id, event_id, &row, number, SeatStatus::Available));
        }
    }
    seats
}

/// A reservation of `seat` by user 1.
#[must_use]
pub fn reservation(
    id: i64,
    seat: &Seat,
    status: ReservationStatus,
    minutes_until_expiry: i64,
) -> Reservation {
    Reservation {
        id: ReservationId::new(id),
        event: EventSummary {
            id: seat.event_id,
            title: format!("Concert {}", seat.event_id),
            venue: "Main Hall".to_string(),
            event_date_time: test_time(),
        },
        seat: SeatSummary {
            id: seat.id,
            row: seat.row.clone(),
            number: seat.number.clone(),
            display: seat.display.clone(),
            price: seat.price,
        },
        user: UserSummary {
            id: UserId::new(1),
            name: "Test User".to_string(),
            email: "user@example.com".to_string(),
        },
        status,
        total_price: seat.price,
        expires_at: Some(test_time()),
        minutes_until_expiry,
        payment_id: None,
    }
}

/// A pending reservation of a default seat with `minutes` left.
#[must_use]
pub fn pending_reservation(id: i64, minutes: i64) -> Reservation {
    let seat = seat(1, 1, "A", 1, SeatStatus::TemporarilyReserved);
    reservation(id, &seat, ReservationStatus::Pending, minutes)
}

/// `reservation` with its status replaced, as the server would return it
/// after a transition.
#[must_use]
pub fn with_status(reservation: &Reservation, status: ReservationStatus) -> Reservation {
    let mut next = reservation.clone();
    next.status = status;
    if status.is_terminal() {
        next.minutes_until_expiry = 0;
    }
    next
}
