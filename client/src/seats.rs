//! Seat availability for one event, with a client-local selection.
//!
//! The server owns seat state. [`SeatMap`] holds the latest snapshot plus at
//! most one selected seat id and enforces two rules:
//!
//! - **Selection**: clicking toggles selection only on an `AVAILABLE` seat;
//!   clicking anything else does nothing
//! - **Reconciliation**: whenever a new snapshot is installed, a selection
//!   whose seat is missing or no longer `AVAILABLE` is cleared
//!
//! [`SeatCatalog`] wraps a [`SeatMap`] with the fetches that keep it current.

use crate::api::EventsApi;
use crate::transport::TransportClient;
use concert_booking_core::{Event, EventId, Result, Seat, SeatId};
use std::cmp::Ordering;

/// One row of the seat map, seats ordered by number.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatRow<'a> {
    /// Row label
    pub label: &'a str,
    /// Seats in display order
    pub seats: Vec<&'a Seat>,
}

/// Seat snapshot plus local selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatMap {
    seats: Vec<Seat>,
    selected: Option<SeatId>,
}

impl SeatMap {
    /// Create a map over `seats` with nothing selected.
    #[must_use]
    pub const fn new(seats: Vec<Seat>) -> Self {
        Self {
            seats,
            selected: None,
        }
    }

    /// All seats, in server order.
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Look up a seat.
    #[must_use]
    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.id == id)
    }

    /// Selected seat id.
    #[must_use]
    pub const fn selected(&self) -> Option<SeatId> {
        self.selected
    }

    /// Selected seat.
    #[must_use]
    pub fn selected_seat(&self) -> Option<&Seat> {
        self.selected.and_then(|id| self.seat(id))
    }

    /// Apply a click on seat `id` and return the resulting selection.
    ///
    /// Clicking the selected seat deselects it. Clicking another available
    /// seat moves the selection there. Clicking an unavailable or unknown
    /// seat leaves the selection as it was.
    pub fn click(&mut self, id: SeatId) -> Option<SeatId> {
        let selectable = self.seat(id).is_some_and(Seat::is_available);
        if selectable {
            self.selected = if self.selected == Some(id) { None } else { Some(id) };
        }
        self.selected
    }

    /// Drop the selection.
    pub const fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Install a fresh snapshot and reconcile the selection against it.
    ///
    /// Returns the id of the selection that was cleared, if any.
    pub fn replace(&mut self, seats: Vec<Seat>) -> Option<SeatId> {
        self.seats = seats;

        let stale = self
            .selected
            .filter(|&id| !self.seat(id).is_some_and(Seat::is_available));
        if stale.is_some() {
            self.selected = None;
        }
        stale
    }

    /// Number of seats currently `AVAILABLE`.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_available()).count()
    }

    /// Seats grouped by row.
    ///
    /// Rows are ordered by label. Within a row, seats are ordered by numeric
    /// seat number; numbers that do not parse sort last, by text.
    #[must_use]
    pub fn rows(&self) -> Vec<SeatRow<'_>> {
        let mut rows: Vec<SeatRow<'_>> = Vec::new();
        let mut sorted: Vec<&Seat> = self.seats.iter().collect();
        sorted.sort_by(|a, b| a.row.cmp(&b.row).then_with(|| compare_numbers(&a.number, &b.number)));

        for seat in sorted {
            match rows.last_mut() {
                Some(row) if row.label == seat.row => row.seats.push(seat),
                _ => rows.push(SeatRow {
                    label: &seat.row,
                    seats: vec![seat],
                }),
            }
        }
        rows
    }
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<u32>(), b.trim().parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Live seat view of one event.
#[derive(Debug, Clone)]
pub struct SeatCatalog {
    transport: TransportClient,
    event_id: EventId,
    event: Option<Event>,
    map: SeatMap,
}

impl SeatCatalog {
    /// Create an empty catalog; call [`SeatCatalog::refresh`] to populate it.
    #[must_use]
    pub const fn new(transport: TransportClient, event_id: EventId) -> Self {
        Self {
            transport,
            event_id,
            event: None,
            map: SeatMap::new(Vec::new()),
        }
    }

    /// Fetch the event and its seats.
    ///
    /// # Errors
    ///
    /// Fails if either fetch fails.
    pub async fn load(transport: TransportClient, event_id: EventId) -> Result<Self> {
        let mut catalog = Self::new(transport, event_id);
        catalog.refresh().await?;
        Ok(catalog)
    }

    /// Re-fetch the event and its seats concurrently, then reconcile the
    /// selection.
    ///
    /// On failure the previous snapshot and selection are kept.
    ///
    /// # Errors
    ///
    /// Fails if either fetch fails.
    pub async fn refresh(&mut self) -> Result<()> {
        let (event, seats) = tokio::try_join!(
            EventsApi::get(&self.transport, self.event_id),
            EventsApi::seats(&self.transport, self.event_id),
        )?;

        tracing::debug!(
            event_id = %self.event_id,
            seats = seats.len(),
            "Seat snapshot refreshed"
        );
        self.event = Some(event);
        if let Some(cleared) = self.map.replace(seats) {
            tracing::info!(
                event_id = %self.event_id,
                seat_id = %cleared,
                "Selected seat is no longer available, selection cleared"
            );
        }
        Ok(())
    }

    /// Event being displayed.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Event details from the last refresh.
    #[must_use]
    pub const fn event(&self) -> Option<&Event> {
        self.event.as_ref()
    }

    /// Current snapshot and selection.
    #[must_use]
    pub const fn map(&self) -> &SeatMap {
        &self.map
    }

    /// See [`SeatMap::click`].
    pub fn click(&mut self, id: SeatId) -> Option<SeatId> {
        self.map.click(id)
    }

    /// See [`SeatMap::clear_selection`].
    pub const fn clear_selection(&mut self) {
        self.map.clear_selection();
    }

    /// See [`SeatMap::seat`].
    #[must_use]
    pub fn seat(&self, id: SeatId) -> Option<&Seat> {
        self.map.seat(id)
    }

    /// See [`SeatMap::selected_seat`].
    #[must_use]
    pub fn selected_seat(&self) -> Option<&Seat> {
        self.map.selected_seat()
    }

    /// See [`SeatMap::rows`].
    #[must_use]
    pub fn rows(&self) -> Vec<SeatRow<'_>> {
        self.map.rows()
    }

    /// See [`SeatMap::available_count`].
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.map.available_count()
    }

    pub(crate) const fn transport(&self) -> &TransportClient {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concert_booking_core::SeatStatus;
    use concert_booking_testing::{fixtures, properties};
    use proptest::prelude::*;

    fn grid() -> SeatMap {
        SeatMap::new(fixtures::seat_grid(1, 2, 3))
    }

    #[test]
    fn test_click_toggles_available_seat() {
        let mut map = grid();
        let a1 = SeatId::new(1);
        let a2 = SeatId::new(2);

        assert_eq!(map.click(a1), Some(a1));
        assert_eq!(map.click(a2), Some(a2));
        assert_eq!(map.click(a2), None);
    }

    #[test]
    fn test_click_on_unavailable_seat_is_noop() {
        let mut seats = fixtures::seat_grid(1, 1, 2);
        seats[1].status = SeatStatus::Reserved;
        let mut map = SeatMap::new(seats);

        map.click(SeatId::new(1));
        assert_eq!(map.click(SeatId::new(2)), Some(SeatId::new(1)));
        assert_eq!(map.click(SeatId::new(99)), Some(SeatId::new(1)));
    }

    #[test]
    fn test_replace_clears_preempted_selection() {
        let mut map = grid();
        map.click(SeatId::new(5));

        let mut next = fixtures::seat_grid(1, 2, 3);
        next[4].status = SeatStatus::TemporarilyReserved;

        assert_eq!(map.replace(next), Some(SeatId::new(5)));
        assert_eq!(map.selected(), None);
    }

    #[test]
    fn test_replace_keeps_still_available_selection() {
        let mut map = grid();
        map.click(SeatId::new(2));

        assert_eq!(map.replace(fixtures::seat_grid(1, 2, 3)), None);
        assert_eq!(map.selected(), Some(SeatId::new(2)));
    }

    #[test]
    fn test_rows_sorted_by_label_then_number() {
        let seats = vec![
            fixtures::seat(1, 1, "B", 2, SeatStatus::Available),
            fixtures::seat(2, 1, "A", 10, SeatStatus::Available),
            fixtures::seat(3, 1, "A", 9, SeatStatus::Reserved),
            fixtures::seat(4, 1, "B", 1, SeatStatus::Available),
        ];
        let map = SeatMap::new(seats);

        let rows = map.rows();
        let layout: Vec<(&str, Vec<&str>)> = rows
            .iter()
            .map(|row| (row.label, row.seats.iter().map(|s| s.display.as_str()).collect()))
            .collect();
        assert_eq!(layout, vec![("A", vec!["A9", "A10"]), ("B", vec!["B1", "B2"])]);
        assert_eq!(map.available_count(), 3);
    }

    #[test]
    fn test_non_numeric_seat_numbers_sort_last() {
        let mut odd = fixtures::seat(3, 1, "A", 0, SeatStatus::Available);
        odd.number = "VIP".to_string();
        let map = SeatMap::new(vec![
            odd,
            fixtures::seat(1, 1, "A", 2, SeatStatus::Available),
            fixtures::seat(2, 1, "A", 1, SeatStatus::Available),
        ]);

        let numbers: Vec<&str> = map.rows()[0].seats.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["1", "2", "VIP"]);
    }

    proptest! {
        #[test]
        fn prop_selection_is_always_available(
            seats in properties::seat_layout(40),
            clicks in prop::collection::vec(0i64..45, 0..60),
        ) {
            let mut map = SeatMap::new(seats);
            for id in clicks {
                map.click(SeatId::new(id));
                if let Some(selected) = map.selected_seat() {
                    prop_assert_eq!(selected.status, SeatStatus::Available);
                }
                prop_assert!(map.selected().is_none() || map.selected_seat().is_some());
            }
        }

        #[test]
        fn prop_reconciliation_after_any_snapshot(
            (seats, next) in properties::seat_layout(30)
                .prop_flat_map(|seats| (Just(seats.clone()), properties::restatused(seats))),
            click in 1i64..31,
        ) {
            let mut map = SeatMap::new(seats);
            map.click(SeatId::new(click));
            map.replace(next);

            if let Some(id) = map.selected() {
                prop_assert!(map.seat(id).is_some_and(Seat::is_available));
            }
        }
    }
}
