//! File-backed key-value store.
//!
//! All keys live in one JSON object on disk. Every write rewrites the whole
//! file through a sibling temp file and an atomic rename, so a crash never
//! leaves a half-written token file behind.
//!
//! # Example
//!
//! ```no_run
//! use concert_booking_auth::providers::KeyValueStore;
//! use concert_booking_auth::stores::FileStore;
//!
//! # async fn example() -> concert_booking_core::Result<()> {
//! let store = FileStore::new("/var/lib/booking/tokens.json");
//! store.set("concert_hub_tokens", "{}".to_string()).await?;
//! # Ok(())
//! # }
//! ```

use crate::providers::KeyValueStore;
use async_trait::async_trait;
use concert_booking_core::{BookingError, Result};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// JSON file store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Entries> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(storage_error("read", &self.path, &e)),
        };

        if text.trim().is_empty() {
            return Ok(Entries::new());
        }

        match serde_json::from_str(&text) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Token file is corrupt, treating it as empty"
                );
                Ok(Entries::new())
            }
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| BookingError::Storage(format!("failed to encode store: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory for", &self.path, &e))?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| storage_error("write", &tmp, &e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error("replace", &self.path, &e))
    }
}

fn storage_error(action: &str, path: &Path, err: &std::io::Error) -> BookingError {
    BookingError::Storage(format!("failed to {action} {}: {err}", path.display()))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value);
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}
