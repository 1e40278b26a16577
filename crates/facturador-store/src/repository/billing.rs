//! # Billing Configuration Repository
//!
//! The persisted billing settings document, `billing_config`:
//!
//! ```json
//! { "igv": 18, "serieFactura": "F001", "...": "..." }
//! ```
//!
//! Only `igv` (a percentage) is interpreted here. Every other field belongs
//! to other screens and is carried through untouched on write.

use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::kv::{KeyValueStore, SharedStore};

/// Store key of the billing configuration document.
pub const BILLING_CONFIG_KEY: &str = "billing_config";

const IGV_FIELD: &str = "igv";

/// Repository for the billing configuration document.
#[derive(Clone)]
pub struct BillingConfigRepository {
    store: SharedStore,
}

impl BillingConfigRepository {
    pub fn new(store: SharedStore) -> Self {
        BillingConfigRepository { store }
    }

    /// The stored IGV percentage, if the document exists and carries one.
    ///
    /// `igv` may be a JSON number or a numeric string (`"18"`).
    pub async fn igv_percent(&self) -> StoreResult<Option<f64>> {
        let Some(doc) = self.load().await? else {
            return Ok(None);
        };

        match doc.get(IGV_FIELD) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(Value::String(s)) => s.trim().parse::<f64>().map(Some).map_err(|_| {
                StoreError::invalid_document(BILLING_CONFIG_KEY, format!("igv is not numeric: {s:?}"))
            }),
            Some(other) => Err(StoreError::invalid_document(
                BILLING_CONFIG_KEY,
                format!("igv has unexpected type: {other}"),
            )),
        }
    }

    /// Writes `percent` into `igv`, keeping every other field.
    ///
    /// Whole percentages are stored as JSON integers (`18`, not `18.0`).
    pub async fn set_igv_percent(&self, percent: f64) -> StoreResult<()> {
        let mut doc = match self.load().await {
            Ok(Some(doc)) => doc,
            Ok(None) => Map::new(),
            Err(StoreError::InvalidDocument { reason, .. }) => {
                warn!(reason = %reason, "Replacing unreadable billing configuration");
                Map::new()
            }
            Err(e) => return Err(e),
        };

        doc.insert(IGV_FIELD.to_string(), percent_value(percent)?);

        debug!(igv_percent = percent, "Persisting billing configuration");
        let raw = serde_json::to_string(&Value::Object(doc))?;
        self.store.set(BILLING_CONFIG_KEY, &raw).await
    }

    /// The raw document, if present.
    pub async fn load(&self) -> StoreResult<Option<Map<String, Value>>> {
        let Some(raw) = self.store.get(BILLING_CONFIG_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(Some(map)),
            Ok(_) => Err(StoreError::invalid_document(
                BILLING_CONFIG_KEY,
                "expected a JSON object",
            )),
            Err(e) => Err(StoreError::invalid_document(BILLING_CONFIG_KEY, e.to_string())),
        }
    }
}

impl std::fmt::Debug for BillingConfigRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingConfigRepository").finish_non_exhaustive()
    }
}

fn percent_value(percent: f64) -> StoreResult<Value> {
    if percent.fract() == 0.0 && percent.abs() < i64::MAX as f64 {
        return Ok(Value::Number(Number::from(percent as i64)));
    }

    let rounded = (percent * 100.0).round() / 100.0;
    Number::from_f64(rounded)
        .map(Value::Number)
        .ok_or_else(|| StoreError::Serialization(format!("igv percent is not finite: {percent}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KeyValueStore;
    use crate::memory::MemoryStore;
    use std::sync::Arc;

    fn repo() -> (Arc<MemoryStore>, BillingConfigRepository) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), BillingConfigRepository::new(store))
    }

    #[tokio::test]
    async fn test_missing_document_has_no_percent() {
        let (_, repo) = repo();
        assert_eq!(repo.igv_percent().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_writes_integer_percent() {
        let (store, repo) = repo();
        repo.set_igv_percent(18.0).await.unwrap();

        assert_eq!(
            store.get(BILLING_CONFIG_KEY).await.unwrap().as_deref(),
            Some(r#"{"igv":18}"#)
        );
        assert_eq!(repo.igv_percent().await.unwrap(), Some(18.0));
    }

    #[tokio::test]
    async fn test_set_keeps_other_fields() {
        let (store, repo) = repo();
        store
            .set(BILLING_CONFIG_KEY, r#"{"igv":18,"serieFactura":"F002"}"#)
            .await
            .unwrap();

        repo.set_igv_percent(10.5).await.unwrap();

        let doc = repo.load().await.unwrap().unwrap();
        assert_eq!(doc["serieFactura"], "F002");
        assert_eq!(doc["igv"].as_f64(), Some(10.5));
    }

    #[tokio::test]
    async fn test_string_percent_is_accepted() {
        let (store, repo) = repo();
        store.set(BILLING_CONFIG_KEY, r#"{"igv":"16"}"#).await.unwrap();
        assert_eq!(repo.igv_percent().await.unwrap(), Some(16.0));
    }

    #[tokio::test]
    async fn test_non_object_document_is_rejected_then_replaced() {
        let (store, repo) = repo();
        store.set(BILLING_CONFIG_KEY, "[1,2]").await.unwrap();

        assert!(matches!(
            repo.igv_percent().await,
            Err(StoreError::InvalidDocument { .. })
        ));

        repo.set_igv_percent(18.0).await.unwrap();
        assert_eq!(repo.igv_percent().await.unwrap(), Some(18.0));
    }
}
