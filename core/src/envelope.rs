//! Wire codec for the booking API.
//!
//! Successful responses arrive wrapped as `{ success, data, message }`.
//! Failures arrive as `{ message, code, status, errors }`. This module turns
//! both into typed values: [`decode`] for the happy path and [`classify`] for
//! mapping a failed response onto the [`BookingError`] taxonomy.
//!
//! # Classification
//!
//! | Status | Server code | Error |
//! |---|---|---|
//! | 401 | any | `Auth(Unauthorized)` |
//! | 404 | any | `NotFound` |
//! | 409 | any | `Conflict` |
//! | 400 | `P001` | `PaymentDeclined` |
//! | 400 | `S***`, `R***`, `E002`, `E003` | `Conflict` |
//! | 400 | other | `Validation` |
//! | other | any | `Server` |

use crate::environment::HttpResponse;
use crate::error::{AuthError, BookingError, FieldViolation, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Success envelope wrapping every response payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the server reports success
    pub success: bool,
    /// Payload (may be absent, e.g. for logout)
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    /// Optional human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned with unsuccessful statuses
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    /// Human-readable message
    pub message: Option<String>,
    /// Machine-readable code (e.g. `S002`)
    pub code: Option<String>,
    /// Field-level violations
    pub errors: Vec<FieldViolation>,
}

impl ErrorBody {
    /// Parse an error body, tolerating empty or non-JSON bodies
    #[must_use]
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// Decode a response into its payload.
///
/// An absent or `null` payload decodes as JSON `null`, so `()` and `Option<T>`
/// targets work for endpoints that return no data.
///
/// # Errors
///
/// - The [`classify`]d error for non-2xx statuses
/// - [`BookingError::Server`] if the envelope reports `success: false`
/// - [`BookingError::Codec`] if the body does not match the envelope
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    if !response.is_success() {
        return Err(classify(response));
    }

    if response.body.trim().is_empty() {
        return from_null();
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(&response.body)
        .map_err(|e| BookingError::Codec(format!("unexpected response body: {e}")))?;

    if !envelope.success {
        return Err(BookingError::Server {
            status: response.status,
            message: envelope.message,
        });
    }

    match envelope.data {
        Some(data) => Ok(data),
        None => from_null(),
    }
}

fn from_null<T: DeserializeOwned>() -> Result<T> {
    serde_json::from_value(serde_json::Value::Null)
        .map_err(|e| BookingError::Codec(format!("response carried no data: {e}")))
}

/// Map an unsuccessful response onto the error taxonomy.
#[must_use]
pub fn classify(response: &HttpResponse) -> BookingError {
    let body = ErrorBody::parse(&response.body);
    let message = body.message.filter(|m| !m.is_empty());

    match response.status {
        401 => BookingError::Auth(AuthError::Unauthorized),
        404 => BookingError::NotFound { message },
        409 => BookingError::Conflict {
            message,
            code: body.code,
        },
        400 => match body.code.as_deref() {
            Some("P001") => BookingError::PaymentDeclined { message },
            Some(code) if is_state_conflict(code) => BookingError::Conflict {
                message,
                code: body.code,
            },
            _ => BookingError::Validation {
                message,
                fields: body.errors,
            },
        },
        status => BookingError::Server { status, message },
    }
}

/// Seat, reservation and event-availability codes describe state the client
/// raced against rather than bad input.
fn is_state_conflict(code: &str) -> bool {
    code.starts_with('S') || code.starts_with('R') || matches!(code, "E002" | "E003")
}
