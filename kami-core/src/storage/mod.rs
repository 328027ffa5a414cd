//! Local key-value persistence.
//!
//! Every store mirrors its state into a single JSON blob under a string key:
//! - `userData`: the login session
//! - `services`, `customers`, `transactions`: the last fetched lists
//!
//! Each key is owned by exactly one store.

mod file;
mod memory;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Well-known keys of the persisted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    UserData,
    Services,
    Customers,
    Transactions,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::UserData => "userData",
            StorageKey::Services => "services",
            StorageKey::Customers => "customers",
            StorageKey::Transactions => "transactions",
        }
    }
}

/// A string-keyed blob store.
pub trait KeyValueStore: Send + Sync {
    /// Returns `Ok(None)` when nothing is stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reads and decodes the JSON blob stored under `key`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: StorageKey,
) -> Result<Option<T>, StorageError> {
    match store.get(key.as_str())? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Decode(key.as_str().to_string(), e)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`, replacing any previous blob.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: StorageKey,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::Encode(key.as_str().to_string(), e))?;
    store.set(key.as_str(), &raw)
}

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] io::Error),
    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
    #[error("Failed to decode stored '{0}': {1}")]
    Decode(String, #[source] serde_json::Error),
    #[error("Failed to encode '{0}': {1}")]
    Encode(String, #[source] serde_json::Error),
}
