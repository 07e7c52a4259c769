//! User registration.

use crate::transport::TransportClient;
use concert_booking_core::{BookingError, FieldViolation, Result, User};
use serde::Serialize;
use std::fmt;

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const MIN_PASSWORD_LEN: usize = 8;

/// Registration input, validated locally before it is sent.
#[derive(Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    /// Display name
    pub name: String,
    /// Email, used as the login name
    pub email: String,
    /// Phone number, digits only
    pub phone_number: String,
    /// Password
    pub password: String,
    /// Repeated password; never sent
    #[serde(skip)]
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Check the form against the client-side policy.
    ///
    /// Every violation is reported in `fields`; the error message is the
    /// first one's reason.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if any rule is broken.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phoneNumber", &self.phone_number),
        ] {
            if value.trim().is_empty() {
                violations.push(FieldViolation::new(field, "", format!("{field} is required")));
            }
        }

        if !self.phone_number.is_empty() && !self.phone_number.chars().all(|c| c.is_ascii_digit()) {
            violations.push(FieldViolation::new(
                "phoneNumber",
                self.phone_number.clone(),
                "phone number must contain digits only",
            ));
        }

        if let Some(reason) = password_problem(&self.password) {
            violations.push(FieldViolation::new("password", "", reason));
        }

        if self.password != self.confirm_password {
            violations.push(FieldViolation::new(
                "confirmPassword",
                "",
                "passwords do not match",
            ));
        }

        match violations.first() {
            None => Ok(()),
            Some(first) => Err(BookingError::Validation {
                message: Some(first.reason.clone()),
                fields: violations,
            }),
        }
    }
}

fn password_problem(password: &str) -> Option<&'static str> {
    let is_special = |c: char| PASSWORD_SPECIALS.contains(c);

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Some("password must be at least 8 characters");
    }
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_special(c));
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(is_special);

    if allowed && has_letter && has_digit && has_special {
        None
    } else {
        Some("password must combine letters, digits and one of @$!%*?&")
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone_number", &self.phone_number)
            .finish_non_exhaustive()
    }
}

/// `/users` endpoints
#[derive(Debug, Clone, Copy)]
pub struct UsersApi;

impl UsersApi {
    /// Validate `form` and `POST /users/register`.
    ///
    /// Nothing is sent if local validation fails.
    ///
    /// # Errors
    ///
    /// - [`BookingError::Validation`] from local validation or server-side
    ///   field checks (e.g. duplicate email)
    /// - Any transport error
    pub async fn register(transport: &TransportClient, form: &RegistrationForm) -> Result<User> {
        form.validate()?;
        let user: User = transport.post("/users/register", form).await?;
        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }
}
