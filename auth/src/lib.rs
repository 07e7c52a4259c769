//! # Concert Booking Authentication
//!
//! Token persistence and session lifecycle for the concert booking client.
//!
//! ## Features
//!
//! - **Pluggable storage**: the token pair lives behind the
//!   [`KeyValueStore`] capability (in-memory, file, or anything else)
//! - **Single-flight refresh**: concurrent refresh requests collapse into one
//!   network exchange
//! - **Fail-closed**: any refresh failure clears the stored session
//!
//! ## Architecture
//!
//! ```text
//! SessionManager ──► TokenStore ──► dyn KeyValueStore
//!        │
//!        └─────────► dyn HttpBackend  (/auth/login, /auth/logout, /auth/refresh)
//! ```
//!
//! ## Example: Login
//!
//! ```rust,ignore
//! use concert_booking_auth::{SessionManager, TokenStore, stores::InMemoryStore};
//!
//! let tokens = TokenStore::new(Arc::new(InMemoryStore::new()));
//! let session = SessionManager::new(tokens, backend);
//!
//! session.login(&Credentials::new("user@example.com", "secret1!")).await?;
//! assert!(session.is_authenticated().await);
//! ```

pub mod constants;
pub mod providers;
pub mod session;
pub mod stores;
pub mod token_store;

// Re-export main types for convenience
pub use constants::DEFAULT_TOKEN_KEY;
pub use providers::KeyValueStore;
pub use session::SessionManager;
pub use stores::{FileStore, InMemoryStore};
pub use token_store::TokenStore;
