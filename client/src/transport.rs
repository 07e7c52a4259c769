//! Session-aware request execution.
//!
//! [`TransportClient`] attaches the current access token to every request.
//! When the server answers 401 it asks the [`SessionManager`] for a refresh
//! and re-issues the request once with the new token. The retry budget is a
//! property of the call, not of the request value, so a request can never be
//! retried twice.
//!
//! ```text
//! request ──► 401 ──► refresh ──► Some(tokens) ──► retry once ──► response
//!                        │                              │
//!                        └─► None ─► SessionExpired     └─► 401 ─► clear + Unauthorized
//! ```

use concert_booking_auth::SessionManager;
use concert_booking_core::{AuthError, HttpBackend, HttpRequest, HttpResponse, Result, decode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Authenticated request executor.
///
/// Cheap to clone; clones share the session and the backend.
#[derive(Clone)]
pub struct TransportClient {
    session: SessionManager,
    backend: Arc<dyn HttpBackend>,
}

impl TransportClient {
    /// Create a transport over `backend` authenticated by `session`.
    #[must_use]
    pub fn new(session: SessionManager, backend: Arc<dyn HttpBackend>) -> Self {
        Self { session, backend }
    }

    /// The session this transport authenticates with.
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Execute `request` and return the raw response.
    ///
    /// Non-401 responses are returned as-is, whatever their status.
    ///
    /// # Errors
    ///
    /// - [`AuthError::SessionExpired`] if a refresh was needed and failed
    /// - [`AuthError::Unauthorized`] if the retried request was still rejected
    /// - [`concert_booking_core::BookingError::Network`] if no response was
    ///   obtained
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let token = self.session.access_token().await;
        let response = self
            .backend
            .execute(request.with_bearer(token.as_deref()))
            .await?;

        if !response.is_unauthorized() {
            return Ok(response);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "Access token rejected, refreshing"
        );

        let Some(tokens) = self.session.refresh_after(token.as_deref()).await else {
            tracing::info!(path = %request.path, "Session expired");
            return Err(AuthError::SessionExpired.into());
        };

        let retried = self
            .backend
            .execute(request.with_bearer(Some(&tokens.access_token)))
            .await?;

        if retried.is_unauthorized() {
            tracing::warn!(path = %request.path, "Still unauthorized after refresh, ending session");
            self.session.clear().await;
            return Err(AuthError::Unauthorized.into());
        }

        Ok(retried)
    }

    /// Execute `request` and decode the envelope payload.
    ///
    /// # Errors
    ///
    /// Any error from [`TransportClient::execute`], or the classified error
    /// of an unsuccessful response.
    pub async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.execute(request).await?;
        decode(&response)
    }

    /// `GET path`
    ///
    /// # Errors
    ///
    /// See [`TransportClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(HttpRequest::get(path)).await
    }

    /// `POST path` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`TransportClient::send`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(HttpRequest::post(path).json(body)?).await
    }

    /// `POST path` without a body
    ///
    /// # Errors
    ///
    /// See [`TransportClient::send`].
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(HttpRequest::post(path)).await
    }

    /// `DELETE path`
    ///
    /// # Errors
    ///
    /// See [`TransportClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(HttpRequest::delete(path)).await
    }
}

impl fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concert_booking_auth::{InMemoryStore, TokenStore};
    use concert_booking_core::{BookingError, Method};
    use concert_booking_testing::{MockBackend, MockResponse, fixtures};
    use serde_json::json;
    use std::time::Duration;

    fn transport(backend: &MockBackend, store: &InMemoryStore) -> TransportClient {
        let backend: Arc<dyn HttpBackend> = Arc::new(backend.clone());
        let session = SessionManager::new(TokenStore::new(Arc::new(store.clone())), Arc::clone(&backend));
        TransportClient::new(session, backend)
    }

    fn logged_in(n: u32) -> InMemoryStore {
        let raw = serde_json::to_string(&fixtures::tokens(n)).unwrap();
        InMemoryStore::with_entries([("concert_hub_tokens", raw)])
    }

    #[tokio::test]
    async fn test_attaches_bearer() {
        let backend = MockBackend::new();
        backend.on(Method::Get, "/events", MockResponse::ok(json!([])));
        let client = transport(&backend, &logged_in(1));

        let _: Vec<serde_json::Value> = client.get("/events").await.unwrap();

        let call = &backend.calls()[0];
        assert_eq!(call.bearer.as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_bearer() {
        let backend = MockBackend::new();
        backend.on(Method::Get, "/events", MockResponse::ok(json!([])));
        let client = transport(&backend, &InMemoryStore::new());

        let _: Vec<serde_json::Value> = client.get("/events").await.unwrap();

        assert_eq!(backend.calls()[0].bearer, None);
    }

    #[tokio::test]
    async fn test_refreshes_and_retries_once() {
        let backend = MockBackend::new();
        backend
            .on_bearer(Method::Get, "/reservations/1", "access-2", MockResponse::ok(json!("ok")))
            .on(
                Method::Post,
                "/auth/refresh",
                MockResponse::ok(fixtures::to_json(&fixtures::tokens(2))),
            );
        let client = transport(&backend, &logged_in(1));

        let value: String = client.get("/reservations/1").await.unwrap();

        assert_eq!(value, "ok");
        let bearers: Vec<_> = backend
            .calls_to(Method::Get, "/reservations/1")
            .into_iter()
            .map(|c| c.bearer)
            .collect();
        assert_eq!(bearers, vec![Some("access-1".into()), Some("access-2".into())]);
        assert_eq!(backend.count(Method::Post, "/auth/refresh"), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_ends_session() {
        let backend = MockBackend::new();
        backend
            .on(Method::Get, "/reservations/1", MockResponse::unauthorized())
            .on(
                Method::Post,
                "/auth/refresh",
                MockResponse::error(401, "J002", "Refresh token expired"),
            );
        let store = logged_in(1);
        let client = transport(&backend, &store);

        let err = client.get::<String>("/reservations/1").await.unwrap_err();

        assert_eq!(err, BookingError::Auth(AuthError::SessionExpired));
        assert!(store.is_empty());
        assert_eq!(backend.count(Method::Get, "/reservations/1"), 1);
    }

    #[tokio::test]
    async fn test_second_401_is_terminal() {
        let backend = MockBackend::new();
        backend
            .on(Method::Get, "/reservations/1", MockResponse::unauthorized())
            .on(
                Method::Post,
                "/auth/refresh",
                MockResponse::ok(fixtures::to_json(&fixtures::tokens(2))),
            );
        let store = logged_in(1);
        let client = transport(&backend, &store);

        let err = client.get::<String>("/reservations/1").await.unwrap_err();

        assert_eq!(err, BookingError::Auth(AuthError::Unauthorized));
        assert_eq!(backend.count(Method::Get, "/reservations/1"), 2);
        assert_eq!(backend.count(Method::Post, "/auth/refresh"), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_non_auth_errors_pass_through() {
        let backend = MockBackend::new();
        backend.on(
            Method::Get,
            "/reservations/9",
            MockResponse::error(404, "R001", "Reservation not found"),
        );
        let client = transport(&backend, &logged_in(1));

        let err = client.get::<String>("/reservations/9").await.unwrap_err();

        assert!(err.is_not_found());
        assert!(backend.calls_to(Method::Post, "/auth/refresh").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_401s_share_one_refresh() {
        let backend = MockBackend::new();
        backend
            .on_bearer(Method::Get, "/events", "access-2", MockResponse::ok(json!([])))
            .on(
                Method::Post,
                "/auth/refresh",
                MockResponse::ok(fixtures::to_json(&fixtures::tokens(2))),
            );
        backend.set_latency(Duration::from_millis(50));
        let client = transport(&backend, &logged_in(1));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.get::<Vec<serde_json::Value>>("/events").await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(backend.count(Method::Post, "/auth/refresh"), 1);
        let calls = backend.calls_to(Method::Get, "/events");
        assert_eq!(calls.len(), 16);
        let retried = calls
            .iter()
            .filter(|c| c.bearer.as_deref() == Some("access-2"))
            .count();
        assert_eq!(retried, 8);
    }
}
