//! AppContext over a real SQLite store.

use std::sync::Arc;

use async_trait::async_trait;
use facturador_core::{CompanyId, DocumentType, SequenceState, TaxConfigUpdate};
use facturador_engine::{
    AppContext, EngineError, EngineResult, FacturadorConfig, NextNumberRequest, RemoteSequence,
    SequenceService,
};
use facturador_store::{Database, DbConfig, KeyValueStore, SharedStore, BILLING_CONFIG_KEY};

struct Offline;

#[async_trait]
impl SequenceService for Offline {
    async fn next_number(&self, _: &NextNumberRequest) -> EngineResult<String> {
        Err(EngineError::RemoteUnavailable("offline".into()))
    }

    async fn list_sequences(&self, _: &CompanyId) -> EngineResult<Vec<RemoteSequence>> {
        Err(EngineError::RemoteUnavailable("offline".into()))
    }
}

fn config_with_company(company: Option<&str>) -> FacturadorConfig {
    let mut config = FacturadorConfig::default();
    config.company.active_id = company.map(str::to_string);
    config
}

async fn sqlite_store() -> (Database, SharedStore) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let store: SharedStore = Arc::new(db.kv());
    (db, store)
}

#[tokio::test]
async fn test_fallback_numbers_persist_in_sqlite() {
    let (_db, store) = sqlite_store().await;
    let ctx = AppContext::with_parts(config_with_company(Some("7")), store.clone(), Arc::new(Offline))
        .await
        .unwrap();

    ctx.allocator()
        .update_series(DocumentType::Boletas, "B003", 10)
        .await
        .unwrap();

    assert_eq!(ctx.next_number(DocumentType::Boletas).await.unwrap(), "B003-000010");
    assert_eq!(ctx.next_number(DocumentType::Boletas).await.unwrap(), "B003-000011");
    assert!(!ctx.check_sequences().await);

    // A second context over the same store continues the sequence.
    let again = AppContext::with_parts(config_with_company(Some("7")), store, Arc::new(Offline))
        .await
        .unwrap();
    assert_eq!(
        again.allocator().local_state(DocumentType::Boletas).await.unwrap(),
        SequenceState::new("B003", 12)
    );
}

#[tokio::test]
async fn test_no_active_company() {
    let (_db, store) = sqlite_store().await;
    let ctx = AppContext::with_parts(config_with_company(None), store, Arc::new(Offline))
        .await
        .unwrap();

    let err = ctx.next_number(DocumentType::Facturas).await.unwrap_err();
    assert!(err.is_missing_company());
    assert!(!ctx.check_sequences().await);
}

#[tokio::test]
async fn test_rate_change_reaches_every_calculator_and_next_start() {
    let (_db, store) = sqlite_store().await;
    let ctx = AppContext::with_parts(config_with_company(Some("7")), store.clone(), Arc::new(Offline))
        .await
        .unwrap();
    let form = ctx.new_tax_calculator();

    assert_eq!(form.calculate_igv(1000.0), 180.0);

    ctx.tax()
        .update_tax_config(TaxConfigUpdate::rate(0.10))
        .await
        .unwrap();

    assert_eq!(form.calculate_igv(100.0), 100.0 * 0.10);
    assert_eq!(form.tax_config().igv_rate, 0.10);
    assert_eq!(
        store.get(BILLING_CONFIG_KEY).await.unwrap().as_deref(),
        Some(r#"{"igv":10}"#)
    );

    let restarted = AppContext::with_parts(config_with_company(Some("7")), store, Arc::new(Offline))
        .await
        .unwrap();
    assert_eq!(restarted.tax().tax_config().igv_rate, 0.10);
}

#[tokio::test]
async fn test_unreadable_billing_config_does_not_block_startup() {
    let (_db, store) = sqlite_store().await;
    store
        .set(BILLING_CONFIG_KEY, r#"{"igv":"dieciocho","ruc":"20123456789"}"#)
        .await
        .unwrap();

    let ctx = AppContext::with_parts(config_with_company(Some("7")), store.clone(), Arc::new(Offline))
        .await
        .unwrap();

    assert_eq!(ctx.tax().tax_config().igv_rate, 0.18);
    assert_eq!(ctx.next_number(DocumentType::Facturas).await.unwrap(), "F001-000001");

    // The next rate change repairs the document and keeps the other fields.
    ctx.tax()
        .update_tax_config(TaxConfigUpdate::rate(0.10))
        .await
        .unwrap();
    assert_eq!(
        store.get(BILLING_CONFIG_KEY).await.unwrap().as_deref(),
        Some(r#"{"igv":10,"ruc":"20123456789"}"#)
    );
}

#[tokio::test]
async fn test_build_opens_database_file() {
    let dir = std::env::temp_dir().join(format!("facturador-ctx-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut config = config_with_company(Some("7"));
    config.storage.database_path = Some(dir.join("nested").join("facturador.db"));
    config.api.base_url = "http://127.0.0.1:9".into();
    config.api.request_timeout_secs = 2;

    let ctx = AppContext::build(config).await.unwrap();
    assert_eq!(ctx.next_number(DocumentType::Facturas).await.unwrap(), "F001-000001");
    ctx.shutdown().await;

    assert!(dir.join("nested").join("facturador.db").exists());
    let _ = std::fs::remove_dir_all(&dir);
}
