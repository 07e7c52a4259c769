//! Key-value store trait.

use async_trait::async_trait;
use concert_booking_core::Result;

/// Scoped durable string storage.
///
/// # Implementation Notes
///
/// - `set` followed by `get` on the same key returns the stored value
/// - `remove` of a missing key succeeds
/// - Failures are reported as [`concert_booking_core::BookingError::Storage`]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backing medium cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the value cannot be persisted.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backing medium cannot be updated.
    async fn remove(&self, key: &str) -> Result<()>;
}
