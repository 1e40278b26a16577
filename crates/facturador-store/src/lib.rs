//! # facturador-store: Durable Local Storage for Facturador
//!
//! The local half of document numbering: a key-value store that keeps the
//! fallback series counters and the billing configuration across restarts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Facturador Data Flow                             │
//! │                                                                         │
//! │  SequenceAllocator / TaxCalculator (facturador-engine)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  facturador-store (THIS CRATE)                  │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────────┐   ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │  Repositories  │   │ KeyValueStore  │   │  Migrations  │   │   │
//! │  │   │                │   │    (trait)     │   │  (embedded)  │   │   │
//! │  │   │ SeriesRepo     │──►│ SqliteKvStore  │   │ 001_kv_store │   │   │
//! │  │   │ BillingRepo    │   │ MemoryStore    │   │              │   │   │
//! │  │   └────────────────┘   └────────────────┘   └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL mode) or process memory                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use facturador_store::{Database, DbConfig, SeriesRepository};
//!
//! let db = Database::new(DbConfig::new("./facturador.db")).await?;
//! let series = SeriesRepository::new(Arc::new(db.kv()));
//! let state = series.get(DocumentType::Facturas).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use kv::{KeyValueStore, SharedStore};
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig};

pub use repository::billing::{BillingConfigRepository, BILLING_CONFIG_KEY};
pub use repository::series::{series_key, SeriesRepository};
pub use repository::sqlite::SqliteKvStore;
