//! `ReqwestBackend` against a local HTTP server.

use concert_booking_auth::{InMemoryStore, SessionManager, TokenStore};
use concert_booking_client::{EventsApi, ReqwestBackend, TransportClient};
use concert_booking_core::{
    BookingError, Credentials, HttpBackend, HttpRequest, SessionTokens, classify,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data, "message": null}))
}

fn backend(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(format!("{}/api/", server.uri()), Some(Duration::from_secs(5))).unwrap()
}

#[tokio::test]
async fn test_sends_bearer_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reservations"))
        .and(header("authorization", "Bearer access-1"))
        .and(body_json(json!({"eventId": 1, "seatId": 5, "userId": 1})))
        .respond_with(envelope(json!({"id": 10})))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest::post("/reservations")
        .json(&json!({"eventId": 1, "seatId": 5, "userId": 1}))
        .unwrap()
        .with_bearer(Some("access-1"));
    let response = backend(&server).execute(request).await.unwrap();

    assert_eq!(response.status, 200);
    assert!(response.body.contains("\"id\":10"));
}

#[tokio::test]
async fn test_error_statuses_are_returned_as_responses() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/reservations/10/cancel"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Reservation already cancelled",
            "code": "R003",
            "status": 409,
            "errors": []
        })))
        .mount(&server)
        .await;

    let response = backend(&server)
        .execute(HttpRequest::delete("/reservations/10/cancel"))
        .await
        .unwrap();

    assert_eq!(response.status, 409);
    let err = classify(&response);
    assert!(err.is_conflict());
    assert_eq!(err.server_message(), Some("Reservation already cancelled"));
}

#[tokio::test]
async fn test_timeout_is_a_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(envelope(json!([])).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let slow = ReqwestBackend::new(format!("{}/api", server.uri()), Some(Duration::from_millis(100))).unwrap();
    let err = slow.execute(HttpRequest::get("/events")).await.unwrap_err();

    assert!(matches!(err, BookingError::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let err = ReqwestBackend::new("http://127.0.0.1:9/api", Some(Duration::from_secs(2)))
        .unwrap()
        .execute(HttpRequest::get("/events"))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::Network(_)));
}

#[tokio::test]
async fn test_login_then_transparent_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "kim@example.com", "password": "secret12!"})))
        .respond_with(envelope(json!({"accessToken": "access-1", "refreshToken": "refresh-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Access token expired",
            "code": "J001",
            "status": 401,
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({"refreshToken": "refresh-1"})))
        .respond_with(envelope(json!({"accessToken": "access-2", "refreshToken": "refresh-2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events"))
        .and(header("authorization", "Bearer access-2"))
        .respond_with(envelope(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let http: Arc<dyn HttpBackend> = Arc::new(backend(&server));
    let store = InMemoryStore::new();
    let session = SessionManager::new(TokenStore::new(Arc::new(store.clone())), Arc::clone(&http));
    session
        .login(&Credentials::new("kim@example.com", "secret12!"))
        .await
        .unwrap();
    let transport = TransportClient::new(session.clone(), http);

    let events = EventsApi::list(&transport).await.unwrap();

    assert!(events.is_empty());
    assert_eq!(
        session.tokens().await.unwrap(),
        Some(SessionTokens::new("access-2", "refresh-2"))
    );
}
