//! # Key-Value Store
//!
//! The persistence seam shared by every store backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      KeyValueStore                                      │
//! │                                                                         │
//! │   get(key) ──► Option<String>        set(key, value) ──► ()            │
//! │                                                                         │
//! │   ┌────────────────────┐        ┌────────────────────┐                 │
//! │   │   SqliteKvStore    │        │    MemoryStore     │                 │
//! │   │  (app runtime)     │        │  (tests, demos)    │                 │
//! │   └────────────────────┘        └────────────────────┘                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque strings to the store; the repositories keep JSON in them.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// Durable string-to-string storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// A store handle shared between repositories.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Reads and decodes the JSON document under `key`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StoreResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::invalid_document(key, e.to_string())),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StoreResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use facturador_core::SequenceState;

    #[tokio::test]
    async fn test_json_helpers_round_trip() {
        let store = MemoryStore::new();
        set_json(&store, "k", &SequenceState::new("F001", 5)).await.unwrap();

        let back: Option<SequenceState> = get_json(&store, "k").await.unwrap();
        assert_eq!(back, Some(SequenceState::new("F001", 5)));
    }

    #[tokio::test]
    async fn test_get_json_reports_bad_documents() {
        let store = MemoryStore::new();
        store.set("k", "not json").await.unwrap();

        let result: StoreResult<Option<SequenceState>> = get_json(&store, "k").await;
        assert!(matches!(result, Err(StoreError::InvalidDocument { .. })));
    }
}
