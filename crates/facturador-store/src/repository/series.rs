//! # Series Repository
//!
//! Local series and counters used when the remote sequence service is
//! unreachable.
//!
//! Each document type lives under its own key, `document_series:{type}`,
//! holding `{"series": "F001", "counter": 42}`. A type that was never
//! written reads as its default series with counter 1.

use facturador_core::{DocumentType, SequenceState};
use tracing::debug;

use crate::error::StoreResult;
use crate::kv::{get_json, set_json, SharedStore};

/// Key prefix for per-type series documents.
pub const SERIES_KEY_PREFIX: &str = "document_series";

/// Store key for `doc_type`'s series document.
pub fn series_key(doc_type: DocumentType) -> String {
    format!("{}:{}", SERIES_KEY_PREFIX, doc_type.key())
}

/// Repository for local series state.
#[derive(Clone)]
pub struct SeriesRepository {
    store: SharedStore,
}

impl SeriesRepository {
    pub fn new(store: SharedStore) -> Self {
        SeriesRepository { store }
    }

    /// Current state for `doc_type`, or its initial state if none is stored.
    pub async fn get(&self, doc_type: DocumentType) -> StoreResult<SequenceState> {
        let stored: Option<SequenceState> =
            get_json(self.store.as_ref(), &series_key(doc_type)).await?;
        Ok(stored.unwrap_or_else(|| SequenceState::initial(doc_type)))
    }

    /// Replaces the stored state for `doc_type`.
    pub async fn put(&self, doc_type: DocumentType, state: &SequenceState) -> StoreResult<()> {
        debug!(
            doc_type = %doc_type,
            series = %state.series,
            counter = state.counter,
            "Persisting local series"
        );
        set_json(self.store.as_ref(), &series_key(doc_type), state).await
    }

    /// State of every document type, in [`DocumentType::ALL`] order.
    pub async fn all(&self) -> StoreResult<Vec<(DocumentType, SequenceState)>> {
        let mut out = Vec::with_capacity(DocumentType::ALL.len());
        for doc_type in DocumentType::ALL {
            out.push((doc_type, self.get(doc_type).await?));
        }
        Ok(out)
    }
}

impl std::fmt::Debug for SeriesRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeriesRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KeyValueStore;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    #[test]
    fn test_series_key() {
        assert_eq!(series_key(DocumentType::Facturas), "document_series:facturas");
        assert_eq!(
            series_key(DocumentType::NotasCredito),
            "document_series:notasCredito"
        );
    }

    #[tokio::test]
    async fn test_missing_type_reads_as_default() {
        let repo = SeriesRepository::new(Arc::new(MemoryStore::new()));

        assert_eq!(
            repo.get(DocumentType::Boletas).await.unwrap(),
            SequenceState::new("B001", 1)
        );
    }

    #[tokio::test]
    async fn test_put_only_touches_its_own_key() {
        let store = Arc::new(MemoryStore::new());
        let repo = SeriesRepository::new(store.clone());

        repo.put(DocumentType::Facturas, &SequenceState::new("F002", 40))
            .await
            .unwrap();

        assert_eq!(
            repo.get(DocumentType::Facturas).await.unwrap(),
            SequenceState::new("F002", 40)
        );
        assert_eq!(
            repo.get(DocumentType::Boletas).await.unwrap(),
            SequenceState::initial(DocumentType::Boletas)
        );
        assert_eq!(store.len().await, 1);
        assert!(store
            .get("document_series:facturas")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_all_lists_every_type() {
        let repo = SeriesRepository::new(Arc::new(MemoryStore::new()));
        let all = repo.all().await.unwrap();

        assert_eq!(all.len(), DocumentType::ALL.len());
        assert_eq!(all[0].0, DocumentType::ALL[0]);
    }
}
