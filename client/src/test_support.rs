//! Shared wiring for unit tests.

use crate::transport::TransportClient;
use concert_booking_auth::{InMemoryStore, SessionManager, TokenStore};
use concert_booking_core::HttpBackend;
use concert_booking_testing::{MockBackend, fixtures};
use std::sync::Arc;

/// A transport over `backend` whose session holds `fixtures::tokens(1)`.
pub fn logged_in_transport(backend: &MockBackend) -> TransportClient {
    let raw = serde_json::to_string(&fixtures::tokens(1)).unwrap();
    let store = InMemoryStore::with_entries([("concert_hub_tokens", raw)]);
    let backend: Arc<dyn HttpBackend> = Arc::new(backend.clone());
    let session = SessionManager::new(TokenStore::new(Arc::new(store)), Arc::clone(&backend));
    TransportClient::new(session, backend)
}
