//! # SQLite Key-Value Store
//!
//! [`KeyValueStore`] over the `kv_store` table.
//!
//! ```text
//! kv_store
//! ┌──────────────────────────────┬──────────────────────────────┬─────────────┐
//! │ key (PK)                     │ value (JSON text)            │ updated_at  │
//! ├──────────────────────────────┼──────────────────────────────┼─────────────┤
//! │ document_series:facturas     │ {"series":"F001","counter":7}│ RFC 3339    │
//! │ billing_config               │ {"igv":18}                   │ RFC 3339    │
//! └──────────────────────────────┴──────────────────────────────┴─────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::trace;

use crate::error::StoreResult;
use crate::kv::KeyValueStore;

/// Key-value store persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKvStore { pool }
    }

    /// Lists every stored key, sorted.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM kv_store ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        trace!(key = %key, "Writing key");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_upsert_and_read_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        assert_eq!(kv.get("billing_config").await.unwrap(), None);

        kv.set("billing_config", r#"{"igv":18}"#).await.unwrap();
        kv.set("billing_config", r#"{"igv":10}"#).await.unwrap();

        assert_eq!(
            kv.get("billing_config").await.unwrap().as_deref(),
            Some(r#"{"igv":10}"#)
        );
        assert_eq!(kv.keys().await.unwrap(), vec!["billing_config".to_string()]);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = std::env::temp_dir().join(format!("facturador-kv-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("store.db");
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            db.kv().set("document_series:boletas", r#"{"series":"B002","counter":3}"#)
                .await
                .unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(
            db.kv().get("document_series:boletas").await.unwrap().as_deref(),
            Some(r#"{"series":"B002","counter":3}"#)
        );
        db.close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }
}
