//! Domain types for the concert booking client.
//!
//! These types mirror the remote service's JSON representation. The client
//! holds them as read-only snapshots: statuses are never advanced locally,
//! only re-read from the server.

use crate::error::{BookingError, Result};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw server identifier
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw server identifier
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for an event
    EventId
);
numeric_id!(
    /// Unique identifier for a seat
    SeatId
);
numeric_id!(
    /// Unique identifier for a reservation
    ReservationId
);
numeric_id!(
    /// Unique identifier for a user
    UserId
);

/// Payment reference attached to a confirmed reservation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Wrap an existing payment reference
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a client-side payment reference (`MOCK_PAYMENT_<unix-millis>`)
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("MOCK_PAYMENT_{}", Utc::now().timestamp_millis()))
    }

    /// Borrow the reference as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Session
// ============================================================================

/// The access/refresh token pair held for the current session.
///
/// `Debug` redacts both tokens so the pair can appear in log fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    /// Short-lived bearer credential
    pub access_token: String,
    /// Longer-lived credential exchanged for a new pair
    pub refresh_token: String,
}

impl SessionTokens {
    /// Create a token pair
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Login credentials
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Events
// ============================================================================

/// Sale status of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Open for booking
    Open,
    /// Every seat is held or sold
    SoldOut,
    /// Booking closed
    Closed,
    /// Event cancelled
    Cancelled,
}

/// A bookable event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Title
    pub title: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Venue name
    pub venue: String,
    /// When the event takes place
    pub event_date_time: NaiveDateTime,
    /// Total seat count
    pub total_seats: u32,
    /// Seats still available
    pub available_seats: u32,
    /// Base price
    pub price: i64,
    /// Sale status
    pub status: EventStatus,
}

impl Event {
    /// Whether the event can currently take reservations
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        matches!(self.status, EventStatus::Open) && self.available_seats > 0
    }
}

// ============================================================================
// Seats
// ============================================================================

/// Availability status of a seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    /// Free to reserve
    Available,
    /// Held by a pending reservation
    TemporarilyReserved,
    /// Sold
    Reserved,
    /// Withdrawn from sale
    Blocked,
}

impl SeatStatus {
    /// Only available seats may become the local selection
    #[must_use]
    pub const fn is_selectable(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// A seat snapshot for one event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    /// Seat identifier
    pub id: SeatId,
    /// Owning event
    pub event_id: EventId,
    /// Row label (e.g. `A`)
    #[serde(rename = "seatRow")]
    pub row: String,
    /// Seat number within the row (e.g. `1`)
    #[serde(rename = "seatNumber")]
    pub number: String,
    /// Display label (e.g. `A1`)
    #[serde(rename = "seatDisplay")]
    pub display: String,
    /// Seat price
    pub price: i64,
    /// Availability status
    pub status: SeatStatus,
    /// When the current temporary hold started
    #[serde(rename = "temporaryReservedAt", default)]
    pub temporarily_reserved_at: Option<NaiveDateTime>,
    /// Whether the server considers the temporary hold lapsed
    #[serde(default)]
    pub expired: bool,
}

impl Seat {
    /// Whether this seat may be selected
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.status.is_selectable()
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// Reservation status.
///
/// Transitions are monotonic and decided by the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Seat held, awaiting payment
    Pending,
    /// Paid
    Confirmed,
    /// Cancelled by the user
    Cancelled,
    /// Hold lapsed before payment
    Expired,
}

impl ReservationStatus {
    /// Terminal statuses admit no further transition and are never polled
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled | Self::Expired)
    }

    /// Whether a reservation in this status can later be reported as `next`.
    ///
    /// A snapshot that fails this check is older than the one it would
    /// replace.
    #[must_use]
    pub const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, _)
                | (Self::Confirmed, Self::Confirmed | Self::Cancelled)
                | (Self::Cancelled, Self::Cancelled)
                | (Self::Expired, Self::Expired)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(label)
    }
}

/// Event details embedded in a reservation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Event identifier
    pub id: EventId,
    /// Title
    pub title: String,
    /// Venue name
    pub venue: String,
    /// When the event takes place
    pub event_date_time: NaiveDateTime,
}

/// Seat details embedded in a reservation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatSummary {
    /// Seat identifier
    pub id: SeatId,
    /// Row label
    #[serde(rename = "seatRow")]
    pub row: String,
    /// Seat number
    #[serde(rename = "seatNumber")]
    pub number: String,
    /// Display label
    #[serde(rename = "seatDisplay")]
    pub display: String,
    /// Seat price
    pub price: i64,
}

/// User details embedded in a reservation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
}

/// A time-boxed hold on one seat, carried through payment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Reservation identifier
    pub id: ReservationId,
    /// Reserved event
    pub event: EventSummary,
    /// Reserved seat
    pub seat: SeatSummary,
    /// Reserving user
    pub user: UserSummary,
    /// Server-authoritative status
    pub status: ReservationStatus,
    /// Amount due
    pub total_price: i64,
    /// When the hold lapses
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
    /// Whole minutes left on the hold, as computed by the server
    #[serde(default)]
    pub minutes_until_expiry: i64,
    /// Payment reference once confirmed
    #[serde(default)]
    pub payment_id: Option<PaymentId>,
}

impl Reservation {
    /// Whether the reservation has reached a terminal status
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// A pending reservation is actionable only while time remains on the hold.
    ///
    /// A zero countdown makes the reservation non-actionable even if the
    /// server has not yet reported `EXPIRED`.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        matches!(self.status, ReservationStatus::Pending) && self.minutes_until_expiry > 0
    }

    /// Check that a confirm request may be issued.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Conflict`] unless the reservation is pending
    /// with time left on the hold.
    pub fn ensure_confirmable(&self) -> Result<()> {
        if self.is_actionable() {
            return Ok(());
        }
        Err(self.not_actionable("confirmed"))
    }

    /// Check that a cancel request may be issued.
    ///
    /// Confirmed reservations can always be cancelled; pending ones only
    /// while time remains on the hold.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Conflict`] otherwise.
    pub fn ensure_cancellable(&self) -> Result<()> {
        if self.is_actionable() || matches!(self.status, ReservationStatus::Confirmed) {
            return Ok(());
        }
        Err(self.not_actionable("cancelled"))
    }

    fn not_actionable(&self, action: &str) -> BookingError {
        let message = if matches!(self.status, ReservationStatus::Pending) {
            format!(
                "Reservation {} can no longer be {action}: its hold has run out",
                self.id
            )
        } else {
            format!(
                "Reservation {} is {} and cannot be {action}",
                self.id, self.status
            )
        };
        BookingError::Conflict {
            message: Some(message),
            code: None,
        }
    }
}

// ============================================================================
// Users and payments
// ============================================================================

/// A registered user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Email
    pub email: String,
    /// Phone number (digits only)
    #[serde(default)]
    pub phone_number: String,
}

/// Result of the payment gateway stand-in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceipt {
    /// Gateway payment reference
    pub payment_id: PaymentId,
    /// Charged amount
    pub amount: i64,
    /// Gateway status (e.g. `SUCCESS`)
    pub status: String,
}
