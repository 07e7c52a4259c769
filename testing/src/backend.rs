//! Scripted HTTP backend.
//!
//! Routes are keyed by `(method, path)`. A route is either a queue of canned
//! responses or a handler closure that inspects the request. Queued responses
//! are served in order and the last one repeats, so a single scripted reply
//! answers every call. Unrouted requests get a 404.
//!
//! Every request is recorded, bearer and body included, so tests can assert
//! on exactly what left the client.

use async_trait::async_trait;
use concert_booking_core::{BookingError, HttpBackend, HttpRequest, HttpResponse, Method, Result};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// One canned outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// The server answered.
    Reply(HttpResponse),
    /// No response was obtained.
    Fail(BookingError),
}

impl MockResponse {
    /// `200` with `{ success: true, data }`.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::status(200, json!({ "success": true, "data": data, "message": null }))
    }

    /// `200` with `{ success: true, data: null }`.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::ok(Value::Null)
    }

    /// `status` with the error body `{ message, code, status, errors: [] }`.
    #[must_use]
    pub fn error(status: u16, code: &str, message: &str) -> Self {
        Self::status(
            status,
            json!({ "message": message, "code": code, "status": status, "errors": [] }),
        )
    }

    /// `401` as produced by an expired access token.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::error(401, "J001", "Access token expired")
    }

    /// Any status with a JSON body.
    #[must_use]
    pub fn status(status: u16, body: Value) -> Self {
        Self::Reply(HttpResponse::new(status, body.to_string()))
    }

    /// Transport failure.
    #[must_use]
    pub fn network(message: &str) -> Self {
        Self::Fail(BookingError::Network(message.to_string()))
    }

    fn into_result(self) -> Result<HttpResponse> {
        match self {
            Self::Reply(response) => Ok(response),
            Self::Fail(error) => Err(error),
        }
    }
}

type Handler = Arc<dyn Fn(&HttpRequest) -> MockResponse + Send + Sync>;

enum Route {
    Queue(VecDeque<MockResponse>),
    Handler(Handler),
}

#[derive(Default)]
struct Inner {
    routes: HashMap<(Method, String), Route>,
    calls: Vec<HttpRequest>,
    latency: Duration,
    route_latency: HashMap<(Method, String), Duration>,
}

/// Mock HTTP backend.
///
/// Clones share routes and the call log.
#[derive(Clone, Default)]
pub struct MockBackend {
    inner: Arc<Mutex<Inner>>,
}

impl MockBackend {
    /// Create a backend with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `response` to the queue for `(method, path)`.
    ///
    /// Replaces a handler previously installed on the same route.
    pub fn on(&self, method: Method, path: &str, response: MockResponse) -> &Self {
        let mut inner = self.lock();
        let route = inner
            .routes
            .entry((method, path.to_string()))
            .or_insert_with(|| Route::Queue(VecDeque::new()));
        match route {
            Route::Queue(queue) => queue.push_back(response),
            Route::Handler(_) => *route = Route::Queue(VecDeque::from([response])),
        }
        self
    }

    /// Answer `(method, path)` by calling `handler` with each request.
    pub fn on_request<F>(&self, method: Method, path: &str, handler: F) -> &Self
    where
        F: Fn(&HttpRequest) -> MockResponse + Send + Sync + 'static,
    {
        self.lock()
            .routes
            .insert((method, path.to_string()), Route::Handler(Arc::new(handler)));
        self
    }

    /// Answer requests carrying bearer `token` with `authorized`, and all
    /// others with a 401.
    pub fn on_bearer(
        &self,
        method: Method,
        path: &str,
        token: &str,
        authorized: MockResponse,
    ) -> &Self {
        let token = token.to_string();
        self.on_request(method, path, move |request| {
            if request.bearer.as_deref() == Some(token.as_str()) {
                authorized.clone()
            } else {
                MockResponse::unauthorized()
            }
        })
    }

    /// Drop every scripted response for `(method, path)`.
    pub fn clear_route(&self, method: Method, path: &str) {
        self.lock().routes.remove(&(method, path.to_string()));
    }

    /// Delay every response by `latency` (observes paused tokio time).
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = latency;
    }

    /// Delay responses for `(method, path)` by `latency` instead of the
    /// backend-wide value.
    pub fn set_route_latency(&self, method: Method, path: &str, latency: Duration) -> &Self {
        self.lock()
            .route_latency
            .insert((method, path.to_string()), latency);
        self
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<HttpRequest> {
        self.lock().calls.clone()
    }

    /// Requests received for `(method, path)`.
    #[must_use]
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .cloned()
            .collect()
    }

    /// Number of requests received for `(method, path)`.
    #[must_use]
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls_to(method, path).len()
    }

    /// Forget recorded calls; routes are kept.
    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }

    fn respond(&self, request: &HttpRequest) -> (MockResponse, Duration) {
        let mut inner = self.lock();
        inner.calls.push(request.clone());
        let key = (request.method, request.path.clone());
        let latency = inner
            .route_latency
            .get(&key)
            .copied()
            .unwrap_or(inner.latency);
        let response = match inner.routes.get_mut(&key) {
            Some(Route::Queue(queue)) if queue.len() > 1 => queue.pop_front(),
            Some(Route::Queue(queue)) => queue.front().cloned(),
            Some(Route::Handler(handler)) => Some(handler(request)),
            None => None,
        };

        let response = response.unwrap_or_else(|| {
            MockResponse::error(
                404,
                "MOCK",
                &format!("no route for {} {}", request.method, request.path),
            )
        });
        (response, latency)
    }
}

#[async_trait]
impl HttpBackend for MockBackend {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let (response, latency) = self.respond(&request);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        response.into_result()
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("MockBackend")
            .field("routes", &inner.routes.len())
            .field("calls", &inner.calls.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queue_serves_in_order_and_last_repeats() {
        let backend = MockBackend::new();
        backend
            .on(Method::Get, "/x", MockResponse::unauthorized())
            .on(Method::Get, "/x", MockResponse::ok(json!(1)));

        let statuses: Vec<u16> = collect_statuses(&backend, 3).await;
        assert_eq!(statuses, vec![401, 200, 200]);
        assert_eq!(backend.count(Method::Get, "/x"), 3);
    }

    async fn collect_statuses(backend: &MockBackend, n: usize) -> Vec<u16> {
        let mut out = Vec::new();
        for _ in 0..n {
            out.push(backend.execute(HttpRequest::get("/x")).await.unwrap().status);
        }
        out
    }

    #[tokio::test]
    async fn test_unrouted_request_is_404() {
        let backend = MockBackend::new();
        let response = backend.execute(HttpRequest::get("/nope")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_bearer_route_and_call_log() {
        let backend = MockBackend::new();
        backend.on_bearer(Method::Get, "/me", "good", MockResponse::ok(json!("me")));

        let denied = backend
            .execute(HttpRequest::get("/me").with_bearer(Some("stale")))
            .await
            .unwrap();
        let allowed = backend
            .execute(HttpRequest::get("/me").with_bearer(Some("good")))
            .await
            .unwrap();

        assert_eq!(denied.status, 401);
        assert_eq!(allowed.status, 200);
        let bearers: Vec<_> = backend
            .calls()
            .into_iter()
            .map(|call| call.bearer)
            .collect();
        assert_eq!(bearers, vec![Some("stale".into()), Some("good".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_route_latency_overrides_backend_latency() {
        let backend = MockBackend::new();
        backend
            .on(Method::Get, "/slow", MockResponse::ok(json!(1)))
            .on(Method::Get, "/fast", MockResponse::ok(json!(2)));
        backend.set_latency(Duration::from_millis(10));
        backend.set_route_latency(Method::Get, "/slow", Duration::from_millis(500));

        let started = tokio::time::Instant::now();
        backend.execute(HttpRequest::get("/fast")).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(10));

        backend.execute(HttpRequest::get("/slow")).await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(510));
    }

    #[tokio::test]
    async fn test_network_failure() {
        let backend = MockBackend::new();
        backend.on(Method::Post, "/x", MockResponse::network("connection refused"));
        let err = backend.execute(HttpRequest::post("/x")).await.unwrap_err();
        assert!(matches!(err, BookingError::Network(_)));
    }
}
