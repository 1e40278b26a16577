//! # Application Context
//!
//! Everything numbering and tax code needs, built once at startup and passed
//! by reference to callers.
//!
//! ```text
//! FacturadorConfig ──► AppContext::build
//!                        ├── Database (SQLite, migrations) ──► SharedStore
//!                        ├── HttpSequenceService (reqwest)
//!                        ├── SequenceAllocator(remote, SeriesRepository)
//!                        ├── TaxConfigBus
//!                        └── TaxCalculator(BillingConfigRepository, bus)
//! ```

use std::sync::Arc;
use tracing::info;

use facturador_core::{CompanyId, DocumentType};
use facturador_store::{
    BillingConfigRepository, Database, DbConfig, SeriesRepository, SharedStore, StoreError,
};

use crate::allocator::SequenceAllocator;
use crate::config::FacturadorConfig;
use crate::error::EngineResult;
use crate::remote::{HttpSequenceService, SequenceService};
use crate::tax::{TaxCalculator, TaxConfigBus};

/// Application-wide services.
pub struct AppContext {
    config: FacturadorConfig,
    database: Option<Database>,
    store: SharedStore,
    bus: TaxConfigBus,
    allocator: SequenceAllocator,
    tax: TaxCalculator,
}

impl AppContext {
    /// Opens the SQLite store and the HTTP client described by `config`.
    pub async fn build(config: FacturadorConfig) -> EngineResult<Self> {
        let path = config.database_path();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::ConnectionFailed(format!("{}: {e}", parent.display())))?;
        }

        let database = Database::new(DbConfig::new(&path)).await?;
        let store: SharedStore = Arc::new(database.kv());
        let remote = Arc::new(HttpSequenceService::from_settings(&config.api)?);

        info!(
            api = %remote.base_url(),
            database = %path.display(),
            "Application context ready"
        );

        let mut context = Self::with_parts(config, store, remote).await?;
        context.database = Some(database);
        Ok(context)
    }

    /// Assembles a context over an existing store and sequence service.
    pub async fn with_parts(
        config: FacturadorConfig,
        store: SharedStore,
        remote: Arc<dyn SequenceService>,
    ) -> EngineResult<Self> {
        let bus = TaxConfigBus::default();
        let allocator = SequenceAllocator::new(remote, SeriesRepository::new(store.clone()));
        let tax = TaxCalculator::load(
            config.tax_config(),
            BillingConfigRepository::new(store.clone()),
            &bus,
        )
        .await?;

        Ok(AppContext {
            config,
            database: None,
            store,
            bus,
            allocator,
            tax,
        })
    }

    pub fn config(&self) -> &FacturadorConfig {
        &self.config
    }

    pub fn allocator(&self) -> &SequenceAllocator {
        &self.allocator
    }

    pub fn tax(&self) -> &TaxCalculator {
        &self.tax
    }

    pub fn bus(&self) -> &TaxConfigBus {
        &self.bus
    }

    /// The configured active company, if any.
    pub fn active_company(&self) -> Option<CompanyId> {
        self.config.company_id()
    }

    /// Next number for `doc_type` under the active company.
    pub async fn next_number(&self, doc_type: DocumentType) -> EngineResult<String> {
        let company = self.active_company();
        self.allocator.get_next_number(doc_type, company.as_ref()).await
    }

    /// Whether the remote has sequences for the active company.
    pub async fn check_sequences(&self) -> bool {
        let company = self.active_company();
        self.allocator.check_sequences(company.as_ref()).await
    }

    /// Another calculator on this context's bus, starting from the current
    /// configuration.
    pub fn new_tax_calculator(&self) -> TaxCalculator {
        TaxCalculator::new(
            self.tax.tax_config(),
            BillingConfigRepository::new(self.store.clone()),
            &self.bus,
        )
    }

    /// Closes the database, if this context opened one.
    pub async fn shutdown(&self) {
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("database", &self.database)
            .field("allocator", &self.allocator)
            .field("tax", &self.tax)
            .finish_non_exhaustive()
    }
}
