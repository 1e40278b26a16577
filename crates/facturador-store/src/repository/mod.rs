//! # Repository Module
//!
//! Typed access to the documents kept in the key-value store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SequenceAllocator                 TaxCalculator                       │
//! │       │                                 │                              │
//! │       ▼                                 ▼                              │
//! │  SeriesRepository                  BillingConfigRepository             │
//! │  document_series:{type}            billing_config                      │
//! │       │                                 │                              │
//! │       └──────────────┬──────────────────┘                              │
//! │                      ▼                                                  │
//! │               dyn KeyValueStore                                        │
//! │        (SqliteKvStore │ MemoryStore)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`series::SeriesRepository`] - Local fallback series and counters
//! - [`billing::BillingConfigRepository`] - Persisted IGV percentage
//! - [`sqlite::SqliteKvStore`] - The SQLite-backed store itself

pub mod billing;
pub mod series;
pub mod sqlite;
