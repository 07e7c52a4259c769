//! Storage providers.
//!
//! The session layer persists nothing itself. It goes through the
//! [`KeyValueStore`] capability, which is injected at construction time.
//!
//! This enables:
//! - **Testing**: [`crate::stores::InMemoryStore`] (deterministic, no I/O)
//! - **Production**: [`crate::stores::FileStore`] or a platform keychain
//!   behind the same trait

pub mod key_value_store;

pub use key_value_store::KeyValueStore;
