//! Persistence of the current token pair.
//!
//! The pair is stored as one JSON value (`{"accessToken", "refreshToken"}`)
//! under a single key of the injected [`KeyValueStore`]. Nothing else in the
//! system reads or writes that key.

use crate::constants::DEFAULT_TOKEN_KEY;
use crate::providers::KeyValueStore;
use concert_booking_core::{BookingError, Result, SessionTokens};
use std::fmt;
use std::sync::Arc;

/// Typed view over the token key of a [`KeyValueStore`].
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl TokenStore {
    /// Use `store` with the default key.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, DEFAULT_TOKEN_KEY)
    }

    /// Use `store` with a custom key.
    #[must_use]
    pub fn with_key(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Storage key in use.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored pair.
    ///
    /// A value that does not decode is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the store cannot be read.
    pub async fn load(&self) -> Result<Option<SessionTokens>> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<SessionTokens>(&raw) {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored tokens are unreadable, ignoring");
                Ok(None)
            }
        }
    }

    /// Replace the stored pair.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the pair cannot be persisted.
    pub async fn save(&self, tokens: &SessionTokens) -> Result<()> {
        let raw = serde_json::to_string(tokens)
            .map_err(|e| BookingError::Storage(format!("failed to encode tokens: {e}")))?;
        self.store.set(&self.key, raw).await
    }

    /// Remove the stored pair.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Storage`] if the key cannot be removed.
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").field("key", &self.key).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::InMemoryStore;

    #[tokio::test]
    async fn test_save_writes_wire_shape_under_key() {
        let backing = InMemoryStore::new();
        let tokens = TokenStore::new(Arc::new(backing.clone()));

        tokens.save(&SessionTokens::new("a1", "r1")).await.unwrap();

        let raw = backing.peek("concert_hub_tokens").unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["accessToken"], "a1");
        assert_eq!(json["refreshToken"], "r1");
    }

    #[tokio::test]
    async fn test_load_round_trip_and_clear() {
        let tokens = TokenStore::with_key(Arc::new(InMemoryStore::new()), "custom");

        assert_eq!(tokens.load().await.unwrap(), None);
        tokens.save(&SessionTokens::new("a1", "r1")).await.unwrap();
        assert_eq!(
            tokens.load().await.unwrap(),
            Some(SessionTokens::new("a1", "r1"))
        );

        tokens.clear().await.unwrap();
        assert_eq!(tokens.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_garbage_value_loads_as_none() {
        let backing = InMemoryStore::with_entries([("concert_hub_tokens", "{oops")]);
        let tokens = TokenStore::new(Arc::new(backing));
        assert_eq!(tokens.load().await.unwrap(), None);
    }
}
