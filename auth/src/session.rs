//! Session management.
//!
//! [`SessionManager`] owns the lifecycle of the token pair: it is the only
//! writer of the [`TokenStore`]. Every other component asks it for the
//! current access token or for a refresh.
//!
//! # Refresh
//!
//! Refreshes are single-flight. However many tasks ask at once, exactly one
//! `POST /auth/refresh` is issued and every caller receives its outcome.
//! Any failure (missing refresh token, rejection, unreachable server,
//! unreadable response) clears the stored pair and yields `None`.
//!
//! [`SessionManager::refresh_after`] additionally skips the network call
//! when the token a request failed with has already been replaced, so a
//! burst of 401s that straddles a completed refresh still costs one refresh.
//!
//! # Generations
//!
//! Every login and every clear starts a new session generation. An exchange
//! only writes its outcome if the generation it started in is still current;
//! a refresh that lands after a logout or a fresh login is discarded.

use crate::constants::endpoints;
use crate::token_store::TokenStore;
use concert_booking_core::{
    AuthError, BookingError, Credentials, ErrorBody, HttpBackend, HttpRequest, Result,
    SessionTokens, decode,
};
use concert_booking_runtime::SingleFlight;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Why an exchange was started.
enum RefreshTrigger {
    /// Always hit the server.
    Explicit,
    /// A request carrying this access token was rejected.
    Rejected(Option<String>),
}

/// Login, logout and refresh over a persisted token pair.
///
/// Cheap to clone; clones share the store, the backend, the refresh slot and
/// the session generation.
#[derive(Clone)]
pub struct SessionManager {
    tokens: TokenStore,
    backend: Arc<dyn HttpBackend>,
    refresh_flight: Arc<SingleFlight<Option<SessionTokens>>>,
    // Held across every store write.
    generation: Arc<Mutex<u64>>,
}

impl SessionManager {
    /// Create a session manager.
    #[must_use]
    pub fn new(tokens: TokenStore, backend: Arc<dyn HttpBackend>) -> Self {
        Self {
            tokens,
            backend,
            refresh_flight: Arc::new(SingleFlight::new()),
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// Exchange credentials for a token pair and persist it.
    ///
    /// A failed login leaves any previously stored session untouched. A
    /// refresh still in flight when the new pair is stored will not
    /// overwrite it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] if the server rejects the login
    /// - [`BookingError::Network`] or [`BookingError::Server`] for transport
    ///   and server failures
    /// - [`BookingError::Storage`] if the new pair cannot be persisted
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionTokens> {
        let request = HttpRequest::post(endpoints::LOGIN).json(credentials)?;
        let response = self.backend.execute(request).await?;

        if matches!(response.status, 400 | 401 | 403 | 404) {
            let body = ErrorBody::parse(&response.body);
            tracing::info!(status = response.status, "Login rejected");
            return Err(AuthError::InvalidCredentials {
                message: body.message.filter(|m| !m.is_empty()),
            }
            .into());
        }

        let tokens: SessionTokens = decode(&response)?;
        let mut generation = self.generation.lock().await;
        *generation += 1;
        self.tokens.save(&tokens).await?;
        tracing::info!(generation = *generation, "Logged in");
        Ok(tokens)
    }

    /// End the session.
    ///
    /// Notifies the server when an access token is held; that call's outcome
    /// is logged and otherwise ignored. The stored pair is then cleared
    /// unconditionally.
    pub async fn logout(&self) {
        if let Some(access) = self.access_token().await {
            let request = HttpRequest::post(endpoints::LOGOUT).with_bearer(Some(&access));
            match self.backend.execute(request).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!("Server acknowledged logout");
                }
                Ok(response) => {
                    tracing::warn!(status = response.status, "Server rejected logout, clearing locally");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Logout request failed, clearing locally");
                }
            }
        }

        self.clear().await;
        tracing::info!("Logged out");
    }

    /// Exchange the stored refresh token for a new pair.
    ///
    /// Concurrent calls share one exchange. Returns `None`, with the store
    /// cleared, if the exchange fails for any reason. If the session was
    /// replaced while the exchange was outstanding, its result is dropped
    /// and whatever pair is stored now is returned instead.
    pub async fn refresh(&self) -> Option<SessionTokens> {
        self.run_exchange(RefreshTrigger::Explicit).await
    }

    /// Refresh because a request carrying `stale_access_token` was rejected.
    ///
    /// If the stored access token already differs from `stale_access_token`
    /// when the exchange starts, the stored pair is returned without a
    /// network call. Callers that arrive while an exchange is outstanding
    /// share its outcome.
    pub async fn refresh_after(&self, stale_access_token: Option<&str>) -> Option<SessionTokens> {
        self.run_exchange(RefreshTrigger::Rejected(stale_access_token.map(str::to_string)))
            .await
    }

    /// Whether a usable access token is stored.
    pub async fn is_authenticated(&self) -> bool {
        self.access_token().await.is_some()
    }

    /// The stored access token, if any.
    ///
    /// Storage failures read as "no token".
    pub async fn access_token(&self) -> Option<String> {
        match self.tokens.load().await {
            Ok(tokens) => tokens
                .map(|t| t.access_token)
                .filter(|token| !token.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored tokens");
                None
            }
        }
    }

    /// The stored pair, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the store cannot be read.
    pub async fn tokens(&self) -> Result<Option<SessionTokens>> {
        self.tokens.load().await
    }

    /// Whether a refresh exchange is currently outstanding.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh_flight.is_in_flight()
    }

    /// Drop the stored pair without contacting the server.
    ///
    /// Starts a new session generation, so an outstanding refresh cannot
    /// bring the old pair back.
    pub async fn clear(&self) {
        let mut generation = self.generation.lock().await;
        *generation += 1;
        self.clear_store().await;
    }

    async fn clear_store(&self) {
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!(error = %e, "Failed to clear stored tokens");
        }
    }

    async fn run_exchange(&self, trigger: RefreshTrigger) -> Option<SessionTokens> {
        let manager = self.clone();
        self.refresh_flight
            .run(move || async move { manager.exchange_refresh_token(trigger).await })
            .await
    }

    async fn exchange_refresh_token(&self, trigger: RefreshTrigger) -> Option<SessionTokens> {
        let (started_in, stored) = {
            let generation = self.generation.lock().await;
            (*generation, self.tokens.load().await)
        };

        if let (RefreshTrigger::Rejected(stale), Ok(Some(current))) = (trigger, &stored) {
            if stale.as_deref() != Some(current.access_token.as_str()) {
                tracing::debug!("Access token already rotated, reusing it");
                return Some(current.clone());
            }
        }

        let outcome = match stored {
            Ok(stored) => self.try_exchange(stored).await,
            Err(e) => Err(e),
        };

        let mut generation = self.generation.lock().await;
        if *generation != started_in {
            tracing::info!(
                started_in,
                current = *generation,
                "Session replaced during refresh, discarding the exchange"
            );
            return self.tokens.load().await.ok().flatten();
        }

        let saved = match outcome {
            Ok(tokens) => self.tokens.save(&tokens).await.map(|()| tokens),
            Err(e) => Err(e),
        };
        match saved {
            Ok(tokens) => {
                tracing::info!("Session refreshed");
                Some(tokens)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, ending session");
                *generation += 1;
                self.clear_store().await;
                None
            }
        }
    }

    async fn try_exchange(&self, stored: Option<SessionTokens>) -> Result<SessionTokens> {
        let current = stored
            .filter(|t| !t.refresh_token.is_empty())
            .ok_or(AuthError::SessionExpired)?;

        let request = HttpRequest::post(endpoints::REFRESH).json(&RefreshRequest {
            refresh_token: &current.refresh_token,
        })?;
        let response = self.backend.execute(request).await?;

        decode(&response).map_err(|e| match e {
            BookingError::Auth(_) | BookingError::NotFound { .. } | BookingError::Validation { .. } => {
                BookingError::Auth(AuthError::SessionExpired)
            }
            other => other,
        })
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("tokens", &self.tokens)
            .field("refresh_flight", &self.refresh_flight)
            .finish_non_exhaustive()
    }
}
