//! Property-based testing strategies using proptest.

use crate::fixtures;
use concert_booking_core::{Seat, SeatStatus};
use proptest::prelude::*;

/// Any seat status.
pub fn seat_status() -> impl Strategy<Value = SeatStatus> {
    prop_oneof![
        Just(SeatStatus::Available),
        Just(SeatStatus::TemporarilyReserved),
        Just(SeatStatus::Reserved),
        Just(SeatStatus::Blocked),
    ]
}

/// A seat layout of up to `max_seats` seats for event 1 with unique ids
/// and arbitrary statuses, spread over rows `A` to `E`.
pub fn seat_layout(max_seats: usize) -> impl Strategy<Value = Vec<Seat>> {
    prop::collection::vec((0u8..5, seat_status()), 1..=max_seats).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (row, status))| {
                let row = char::from(b'A' + row).to_string();
                let id = i64::try_from(i).unwrap_or(i64::MAX - 1) + 1;
                let number = u32::try_from(i).unwrap_or(u32::MAX - 1) + 1;
                fixtures::seat(id, 1, &row, number, status)
            })
            .collect()
    })
}

/// Re-roll the status of every seat in `seats`.
pub fn restatused(seats: Vec<Seat>) -> impl Strategy<Value = Vec<Seat>> {
    let len = seats.len();
    prop::collection::vec(seat_status(), len).prop_map(move |statuses| {
        seats
            .iter()
            .zip(statuses)
            .map(|(seat, status)| Seat {
                status,
                ..seat.clone()
            })
            .collect()
    })
}
