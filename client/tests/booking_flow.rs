//! End-to-end booking flows against a scripted backend.

use concert_booking_auth::{DEFAULT_TOKEN_KEY, InMemoryStore, SessionManager, TokenStore};
use concert_booking_client::{ReservationLifecycle, SeatCatalog, TransportClient};
use concert_booking_core::{
    AuthError, BookingError, EventId, HttpBackend, Method, PaymentId, ReservationStatus, SeatId,
    SeatStatus, UserId,
};
use concert_booking_testing::{MockBackend, MockResponse, fixtures};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const SEATS: &str = "/events/1/seats";
const RESERVATION: &str = "/reservations/10";

fn wire(backend: &MockBackend) -> (TransportClient, InMemoryStore) {
    let raw = serde_json::to_string(&fixtures::tokens(1)).unwrap();
    let store = InMemoryStore::with_entries([(DEFAULT_TOKEN_KEY, raw)]);
    let http: Arc<dyn HttpBackend> = Arc::new(backend.clone());
    let session = SessionManager::new(TokenStore::new(Arc::new(store.clone())), Arc::clone(&http));
    (TransportClient::new(session, http), store)
}

fn serve_event(backend: &MockBackend) {
    backend
        .on(Method::Get, "/events/1", MockResponse::ok(fixtures::to_json(&fixtures::event(1, 6))))
        .on(Method::Get, SEATS, MockResponse::ok(fixtures::to_json(&fixtures::seat_grid(1, 2, 3))));
}

#[tokio::test(start_paused = true)]
async fn test_hold_poll_and_confirm_seat_a1() {
    concert_booking_testing::init_tracing();
    let backend = MockBackend::new();
    serve_event(&backend);

    let a1 = fixtures::seat_grid(1, 2, 3).remove(0);
    let held = fixtures::reservation(10, &a1, ReservationStatus::Pending, 15);
    let mut later = held.clone();
    later.minutes_until_expiry = 14;

    backend
        .on_request(Method::Post, "/reservations", {
            let held = held.clone();
            move |request| {
                assert_eq!(
                    request.body,
                    Some(json!({"eventId": 1, "seatId": 1, "userId": 1}))
                );
                MockResponse::ok(fixtures::to_json(&held))
            }
        })
        .on(Method::Get, RESERVATION, MockResponse::ok(fixtures::to_json(&later)))
        .on(
            Method::Post,
            "/payments/mock/10",
            MockResponse::ok(json!({"paymentId": "PAY_1", "amount": 50000, "status": "SUCCESS"})),
        )
        .on_request(Method::Post, "/reservations/10/confirm", {
            let later = later.clone();
            move |request| {
                let mut confirmed = fixtures::with_status(&later, ReservationStatus::Confirmed);
                let payment_id = request
                    .body
                    .as_ref()
                    .and_then(|body| body["paymentId"].as_str())
                    .map(PaymentId::new);
                confirmed.payment_id = payment_id;
                MockResponse::ok(fixtures::to_json(&confirmed))
            }
        });

    let (transport, _store) = wire(&backend);
    let mut catalog = SeatCatalog::load(transport, EventId::new(1)).await.unwrap();
    assert_eq!(catalog.click(SeatId::new(1)), Some(SeatId::new(1)));

    let lifecycle = ReservationLifecycle::create(&mut catalog, UserId::new(1)).await.unwrap();
    assert_eq!(catalog.selected_seat(), None);
    assert_eq!(lifecycle.reservation().minutes_until_expiry, 15);

    let polling = lifecycle.start_polling();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.count(Method::Get, RESERVATION), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(backend.count(Method::Get, RESERVATION), 1);
    assert_eq!(lifecycle.reservation().minutes_until_expiry, 14);
    assert!(lifecycle.view().can_act());

    let confirmed = lifecycle.confirm(PaymentId::new("MOCK_PAYMENT_1")).await.unwrap();
    assert_eq!(confirmed.status, ReservationStatus::Confirmed);
    assert_eq!(
        confirmed.payment_id.as_ref().map(PaymentId::as_str),
        Some("MOCK_PAYMENT_1")
    );

    let paths: Vec<String> = backend
        .calls()
        .into_iter()
        .filter(|c| c.method == Method::Post)
        .map(|c| c.path)
        .collect();
    assert_eq!(
        paths,
        vec!["/reservations", "/payments/mock/10", "/reservations/10/confirm"]
    );

    tokio::time::sleep(Duration::from_secs(5 * 60)).await;
    assert!(polling.is_finished());
    assert_eq!(backend.count(Method::Get, RESERVATION), 1);
    assert!(!lifecycle.view().can_act());
}

#[tokio::test]
async fn test_lost_race_for_b2_refreshes_seat_map() {
    let backend = MockBackend::new();
    serve_event(&backend);

    let mut taken = fixtures::seat_grid(1, 2, 3);
    taken[4].status = SeatStatus::TemporarilyReserved;
    backend
        .on(Method::Get, SEATS, MockResponse::ok(fixtures::to_json(&taken)))
        .on(
            Method::Post,
            "/reservations",
            MockResponse::error(400, "S002", "Seat is already reserved"),
        );

    let (transport, _store) = wire(&backend);
    let mut catalog = SeatCatalog::load(transport, EventId::new(1)).await.unwrap();
    let b2 = SeatId::new(5);
    assert_eq!(catalog.seat(b2).unwrap().display, "B2");
    catalog.click(b2);

    let err = ReservationLifecycle::create(&mut catalog, UserId::new(1)).await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.server_message(), Some("Seat is already reserved"));
    assert_eq!(catalog.selected_seat(), None);
    assert_eq!(catalog.seat(b2).unwrap().status, SeatStatus::TemporarilyReserved);
    assert_eq!(backend.count(Method::Get, SEATS), 2);
    assert_eq!(catalog.available_count(), 5);
}

#[tokio::test]
async fn test_create_without_selection_sends_nothing() {
    let backend = MockBackend::new();
    serve_event(&backend);
    let (transport, _store) = wire(&backend);
    let mut catalog = SeatCatalog::load(transport, EventId::new(1)).await.unwrap();
    backend.reset_calls();

    let err = ReservationLifecycle::create(&mut catalog, UserId::new(1)).await.unwrap_err();

    assert!(matches!(err, BookingError::Validation { .. }));
    assert!(backend.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_polling_ends_with_the_session() {
    let backend = MockBackend::new();
    backend
        .on(Method::Get, RESERVATION, MockResponse::unauthorized())
        .on(
            Method::Post,
            "/auth/refresh",
            MockResponse::error(401, "J002", "Refresh token expired"),
        );
    let (transport, store) = wire(&backend);

    let lifecycle = ReservationLifecycle::from_reservation(transport, fixtures::pending_reservation(10, 15));
    let polling = lifecycle.start_polling();
    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(polling.is_finished());
    assert!(store.is_empty());
    assert_eq!(backend.count(Method::Post, "/auth/refresh"), 1);

    let err = lifecycle.poll().await.unwrap_err();
    assert_eq!(err, BookingError::Auth(AuthError::SessionExpired));
}

#[tokio::test]
async fn test_attach_loads_existing_reservation() {
    let backend = MockBackend::new();
    backend.on(
        Method::Get,
        RESERVATION,
        MockResponse::ok(fixtures::to_json(&fixtures::pending_reservation(10, 9))),
    );
    let (transport, _store) = wire(&backend);

    let lifecycle = ReservationLifecycle::attach(transport, concert_booking_core::ReservationId::new(10))
        .await
        .unwrap();

    assert_eq!(lifecycle.reservation().minutes_until_expiry, 9);
    assert_eq!(lifecycle.view().last_error, None);
}
