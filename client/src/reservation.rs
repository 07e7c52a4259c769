//! Reservation lifecycle.
//!
//! A reservation is a server-owned, time-boxed hold on one seat:
//!
//! ```text
//!            confirm(payment)            cancel
//!  PENDING ───────────────────► CONFIRMED ──────► CANCELLED
//!     │  cancel                                      ▲
//!     ├──────────────────────────────────────────────┘
//!     │  hold runs out (observed by polling)
//!     └──────────────────────────────► EXPIRED
//! ```
//!
//! The client never advances the status itself. It requests a transition
//! and publishes whatever the server answers, unless the answer would move
//! the status backwards along the diagram above: a read that left before a
//! confirm or cancel landed is dropped. Actions on a pending
//! reservation whose countdown has reached zero are rejected locally.
//!
//! The current [`ReservationView`] is published on a `watch` channel so any
//! number of observers can render it.

use crate::api::{CreateReservation, PaymentsApi, ReservationsApi};
use crate::config::{ClientConfig, DEFAULT_POLL_INTERVAL};
use crate::seats::SeatCatalog;
use crate::transport::TransportClient;
use concert_booking_core::{
    BookingError, PaymentId, Reservation, ReservationId, Result, UserId,
};
use concert_booking_runtime::{PollHandle, spawn_poller};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Generic message shown when a failed confirm carries no server message.
pub const CONFIRM_FAILED_MESSAGE: &str = "Payment failed.";

/// Generic message shown when a failed cancel carries no server message.
pub const CANCEL_FAILED_MESSAGE: &str = "Cancellation failed.";

/// What observers of a reservation render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationView {
    /// Last server-confirmed state
    pub reservation: Reservation,
    /// User-facing message of the most recent failed action
    pub last_error: Option<String>,
    /// A confirm or cancel is outstanding
    pub in_flight: bool,
}

impl ReservationView {
    /// Whether confirm/cancel affordances should be enabled.
    #[must_use]
    pub const fn can_act(&self) -> bool {
        !self.in_flight && self.reservation.is_actionable()
    }
}

/// One reservation's state machine.
///
/// Cheap to clone; clones drive and observe the same reservation.
#[derive(Debug, Clone)]
pub struct ReservationLifecycle {
    transport: TransportClient,
    id: ReservationId,
    state: Arc<watch::Sender<ReservationView>>,
    busy: Arc<AtomicBool>,
    poll_interval: Duration,
}

/// Clears the busy flag and the published `in_flight` marker on drop.
struct ActionGuard<'a> {
    lifecycle: &'a ReservationLifecycle,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.lifecycle.state.send_modify(|view| view.in_flight = false);
        self.lifecycle.busy.store(false, Ordering::Release);
    }
}

impl ReservationLifecycle {
    /// Reserve the seat selected in `catalog` for `user_id`.
    ///
    /// On success the selection is cleared: the seat is now held.
    /// If the server reports the seat or event as gone (`Conflict` or
    /// `NotFound`), the catalog is refreshed before the error is returned so
    /// the caller sees the current map.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Validation`] if no seat is selected
    /// - [`BookingError::Conflict`] if the seat was taken first
    /// - Any transport error
    pub async fn create(catalog: &mut SeatCatalog, user_id: UserId) -> Result<Self> {
        let seat = catalog
            .selected_seat()
            .ok_or_else(|| BookingError::validation("Select a seat first."))?;
        let request = CreateReservation {
            event_id: catalog.event_id(),
            seat_id: seat.id,
            user_id,
        };
        let transport = catalog.transport().clone();

        match ReservationsApi::create(&transport, &request).await {
            Ok(reservation) => {
                tracing::info!(
                    reservation_id = %reservation.id,
                    seat_id = %request.seat_id,
                    minutes_until_expiry = reservation.minutes_until_expiry,
                    "Reservation created"
                );
                catalog.clear_selection();
                Ok(Self::from_reservation(transport, reservation))
            }
            Err(e) => {
                tracing::info!(seat_id = %request.seat_id, error = %e, "Reservation rejected");
                if e.is_conflict() || e.is_not_found() {
                    if let Err(refresh_err) = catalog.refresh().await {
                        tracing::warn!(error = %refresh_err, "Seat refresh after rejection failed");
                    }
                }
                Err(e)
            }
        }
    }

    /// Load an existing reservation by id.
    ///
    /// # Errors
    ///
    /// [`BookingError::NotFound`] for an unknown id, or any transport error.
    pub async fn attach(transport: TransportClient, id: ReservationId) -> Result<Self> {
        let reservation = ReservationsApi::get(&transport, id).await?;
        Ok(Self::from_reservation(transport, reservation))
    }

    /// Track an already-fetched reservation.
    #[must_use]
    pub fn from_reservation(transport: TransportClient, reservation: Reservation) -> Self {
        let id = reservation.id;
        let (state, _) = watch::channel(ReservationView {
            reservation,
            last_error: None,
            in_flight: false,
        });
        Self {
            transport,
            id,
            state: Arc::new(state),
            busy: Arc::new(AtomicBool::new(false)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the polling interval (default 60 seconds).
    ///
    /// A zero interval is ignored.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            tracing::warn!(
                reservation_id = %self.id,
                kept_secs = self.poll_interval.as_secs(),
                "Ignoring zero poll interval"
            );
        } else {
            self.poll_interval = interval;
        }
        self
    }

    /// Apply client settings (the polling interval).
    #[must_use]
    pub fn configured(self, config: &ClientConfig) -> Self {
        self.with_poll_interval(config.poll_interval)
    }

    /// Interval between polls
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Reservation id
    #[must_use]
    pub const fn id(&self) -> ReservationId {
        self.id
    }

    /// Snapshot of the current view
    #[must_use]
    pub fn view(&self) -> ReservationView {
        self.state.borrow().clone()
    }

    /// Last server-confirmed reservation
    #[must_use]
    pub fn reservation(&self) -> Reservation {
        self.state.borrow().reservation.clone()
    }

    /// Observe view changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ReservationView> {
        self.state.subscribe()
    }

    /// Re-read the reservation from the server and publish it.
    ///
    /// Returns the reservation as published. If a confirm or cancel settled
    /// while the read was outstanding, that is the newer state rather than
    /// the read's.
    ///
    /// # Errors
    ///
    /// Any transport or classification error; the view is left unchanged.
    pub async fn poll(&self) -> Result<Reservation> {
        let reservation = ReservationsApi::get(&self.transport, self.id).await?;
        Ok(self.publish(reservation))
    }

    /// Pay for and confirm the reservation.
    ///
    /// Issues the payment call, then the confirm call carrying `payment_id`.
    /// On failure the reservation is left as the server last reported it
    /// and the error's message (or a generic one) is published as
    /// `last_error`.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Conflict`] without any network call if the
    ///   reservation is not pending, its countdown is zero, or another
    ///   action is in flight
    /// - [`BookingError::PaymentDeclined`] if the gateway declines
    /// - Any transport error
    pub async fn confirm(&self, payment_id: PaymentId) -> Result<Reservation> {
        let _guard = self.begin_action()?;
        if let Err(e) = self.reservation().ensure_confirmable() {
            return Err(self.reject(e, CONFIRM_FAILED_MESSAGE));
        }

        let outcome = async {
            let receipt = PaymentsApi::mock_payment(&self.transport, self.id).await?;
            tracing::debug!(
                reservation_id = %self.id,
                gateway_payment_id = %receipt.payment_id,
                "Payment processed, confirming"
            );
            ReservationsApi::confirm(&self.transport, self.id, &payment_id).await
        }
        .await;

        self.settle(outcome, CONFIRM_FAILED_MESSAGE).await
    }

    /// Cancel the reservation.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Conflict`] without any network call if the
    ///   reservation is neither actionable nor confirmed, or another action
    ///   is in flight
    /// - Any transport error
    pub async fn cancel(&self) -> Result<Reservation> {
        let _guard = self.begin_action()?;
        if let Err(e) = self.reservation().ensure_cancellable() {
            return Err(self.reject(e, CANCEL_FAILED_MESSAGE));
        }

        let outcome = ReservationsApi::cancel(&self.transport, self.id).await;
        self.settle(outcome, CANCEL_FAILED_MESSAGE).await
    }

    /// Start re-reading the reservation every poll interval.
    ///
    /// Polling ends once a terminal status is observed (whether by a poll or
    /// by a confirm/cancel), when the reservation is gone, or when the
    /// session ends. Other failures are logged and retried on the next tick.
    /// Dropping or stopping the handle cancels polling immediately.
    #[must_use]
    pub fn start_polling(&self) -> PollHandle {
        let lifecycle = self.clone();
        tracing::debug!(
            reservation_id = %self.id,
            interval_secs = self.poll_interval.as_secs(),
            "Polling reservation"
        );
        spawn_poller("reservation", self.poll_interval, move || {
            let lifecycle = lifecycle.clone();
            async move { lifecycle.poll_tick().await }
        })
    }

    async fn poll_tick(&self) -> ControlFlow<()> {
        if self.reservation().is_terminal() {
            return ControlFlow::Break(());
        }

        match self.poll().await {
            Ok(reservation) if reservation.is_terminal() => ControlFlow::Break(()),
            Ok(_) => ControlFlow::Continue(()),
            Err(e) if e.is_not_found() || e.is_auth() => {
                tracing::info!(reservation_id = %self.id, error = %e, "Stopping reservation polling");
                ControlFlow::Break(())
            }
            Err(e) => {
                tracing::warn!(reservation_id = %self.id, error = %e, "Reservation poll failed");
                ControlFlow::Continue(())
            }
        }
    }

    fn begin_action(&self) -> Result<ActionGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BookingError::conflict(
                "Another action on this reservation is still in progress.",
            ));
        }
        self.state.send_modify(|view| view.in_flight = true);
        Ok(ActionGuard { lifecycle: self })
    }

    async fn settle(&self, outcome: Result<Reservation>, fallback: &str) -> Result<Reservation> {
        match outcome {
            Ok(reservation) => {
                let reservation = self.publish(reservation);
                self.state.send_modify(|view| view.last_error = None);
                Ok(reservation)
            }
            Err(e) => {
                let e = self.reject(e, fallback);
                if e.is_conflict() {
                    if let Err(poll_err) = self.poll().await {
                        tracing::warn!(error = %poll_err, "Re-reading reservation after conflict failed");
                    }
                }
                Err(e)
            }
        }
    }

    /// Record a failed action for observers.
    fn reject(&self, error: BookingError, fallback: &str) -> BookingError {
        tracing::info!(reservation_id = %self.id, error = %error, "Reservation action failed");
        let message = error.user_message(fallback);
        self.state.send_modify(|view| view.last_error = Some(message));
        error
    }

    /// Install a server-confirmed reservation and return what is now
    /// published.
    ///
    /// A snapshot whose status the current one cannot turn into is stale and
    /// is dropped.
    fn publish(&self, reservation: Reservation) -> Reservation {
        let mut kept = None;
        self.state.send_if_modified(|view| {
            let from = view.reservation.status;
            if !from.can_become(reservation.status) {
                tracing::debug!(
                    reservation_id = %reservation.id,
                    current = %from,
                    stale = %reservation.status,
                    "Ignoring stale reservation snapshot"
                );
                kept = Some(view.reservation.clone());
                return false;
            }
            if from != reservation.status {
                tracing::info!(
                    reservation_id = %reservation.id,
                    from = %from,
                    to = %reservation.status,
                    "Reservation status changed"
                );
            }
            view.reservation = reservation.clone();
            true
        });
        kept.unwrap_or(reservation)
    }
}
