//! [`KeyValueStore`](crate::providers::KeyValueStore) implementations.
//!
//! - [`InMemoryStore`]: process-local, lost on exit
//! - [`FileStore`]: a JSON object on disk, survives restarts

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::InMemoryStore;
