//! Error types for booking operations.

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Authentication failures.
///
/// Only one of these is ever recovered transparently (an expired access
/// token, via refresh and a single retry). Everything here is what is left
/// once that recovery has been tried or does not apply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login was rejected.
    #[error("Invalid credentials: {}", .message.as_deref().unwrap_or("login failed"))]
    InvalidCredentials {
        /// Server-provided reason
        message: Option<String>,
    },

    /// The refresh token was missing, rejected, or could not be exchanged.
    #[error("Session expired")]
    SessionExpired,

    /// The request was still unauthorized after one refresh and retry.
    #[error("Unauthorized")]
    Unauthorized,
}

/// One rejected field from a server-side or local validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldViolation {
    /// Field name
    pub field: String,
    /// Rejected value (may be empty)
    #[serde(default)]
    pub value: String,
    /// Why it was rejected
    #[serde(default)]
    pub reason: String,
}

impl FieldViolation {
    /// Create a field violation
    #[must_use]
    pub fn new(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Error taxonomy for every booking operation.
///
/// Variants carrying `message: Option<String>` hold the server-provided
/// message when there was one. Use [`BookingError::user_message`] to get text
/// suitable for display with a caller-chosen fallback.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Authorization
    // ═══════════════════════════════════════════════════════════

    /// Authentication failed or the session is gone.
    #[error(transparent)]
    Auth(#[from] AuthError),

    // ═══════════════════════════════════════════════════════════
    // Business rejections
    // ═══════════════════════════════════════════════════════════

    /// Seat no longer available, or reservation not modifiable in its state.
    #[error("Conflict: {}", .message.as_deref().unwrap_or("the seat or reservation is no longer available"))]
    Conflict {
        /// Server-provided or locally generated message
        message: Option<String>,
        /// Server error code (e.g. `S002`)
        code: Option<String>,
    },

    /// Malformed input.
    #[error("Validation failed: {}", .message.as_deref().unwrap_or("invalid input"))]
    Validation {
        /// Summary message
        message: Option<String>,
        /// Individual field violations
        fields: Vec<FieldViolation>,
    },

    /// Reservation, event, or seat id no longer resolvable.
    #[error("Not found: {}", .message.as_deref().unwrap_or("resource not found"))]
    NotFound {
        /// Server-provided message
        message: Option<String>,
    },

    /// The payment gateway declined the charge.
    #[error("Payment declined: {}", .message.as_deref().unwrap_or("payment failed"))]
    PaymentDeclined {
        /// Server-provided message
        message: Option<String>,
    },

    // ═══════════════════════════════════════════════════════════
    // Infrastructure
    // ═══════════════════════════════════════════════════════════

    /// Transport failure unrelated to authorization.
    #[error("Network error: {0}")]
    Network(String),

    /// Any other unsuccessful status.
    #[error("Server error (status {status}): {}", .message.as_deref().unwrap_or("unexpected response"))]
    Server {
        /// HTTP status code
        status: u16,
        /// Server-provided message
        message: Option<String>,
    },

    /// A body could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Local token storage failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BookingError {
    /// Build a local validation error without field details.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: Some(message.into()),
            fields: Vec::new(),
        }
    }

    /// Build a local conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: Some(message.into()),
            code: None,
        }
    }

    /// The server-provided (or locally generated) message, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Auth(AuthError::InvalidCredentials { message })
            | Self::Conflict { message, .. }
            | Self::Validation { message, .. }
            | Self::NotFound { message }
            | Self::PaymentDeclined { message }
            | Self::Server { message, .. } => message.as_deref(),
            Self::Auth(_) | Self::Network(_) | Self::Codec(_) | Self::Storage(_) => None,
        }
    }

    /// Message for display: the server's message, else `fallback`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use concert_booking_core::BookingError;
    /// let err = BookingError::PaymentDeclined { message: None };
    /// assert_eq!(err.user_message("Payment failed."), "Payment failed.");
    /// ```
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    /// Returns `true` for errors that end the session.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns `true` for seat/reservation state conflicts.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns `true` if the target no longer exists.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if retrying the same request later might succeed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use concert_booking_core::BookingError;
    /// assert!(BookingError::Network("connection reset".into()).is_retryable());
    /// assert!(!BookingError::NotFound { message: None }.is_retryable());
    /// ```
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
