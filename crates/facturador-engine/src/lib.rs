//! # facturador-engine: Numbering & Tax Services
//!
//! The two services the invoicing forms call:
//!
//! - [`SequenceAllocator`] hands out `SERIES-NNNNNN` numbers. It asks the
//!   remote sequence service first and falls back to a local counter when
//!   the remote can't answer.
//! - [`TaxCalculator`] computes IGV and totals at the current rate and picks
//!   up rate changes made through any other calculator on the same
//!   [`TaxConfigBus`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   facturador-cli / front-end bridge                                     │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   ┌─────────────────────────────────────────────────────────────────┐  │
//! │   │                facturador-engine (THIS CRATE)                   │  │
//! │   │                                                                 │  │
//! │   │   AppContext ─┬─► SequenceAllocator ──► SequenceService (HTTP)  │  │
//! │   │               │          │                                     │  │
//! │   │               │          └─────────► SeriesRepository           │  │
//! │   │               │                                                 │  │
//! │   │               └─► TaxCalculator ───► BillingConfigRepository    │  │
//! │   │                          ▲                                      │  │
//! │   │                          └── TaxConfigBus (broadcast)           │  │
//! │   └─────────────────────────────────────────────────────────────────┘  │
//! │          │                                                              │
//! │          ▼                                                              │
//! │   facturador-store (SQLite / memory)     facturador-core (pure logic)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let config = FacturadorConfig::load(None)?;
//! let ctx = AppContext::build(config).await?;
//!
//! let number = ctx.next_number(DocumentType::Facturas).await?;
//! let total = ctx.tax().calculate_total(1000.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocator;
pub mod config;
pub mod context;
pub mod error;
pub mod remote;
pub mod tax;

// =============================================================================
// Re-exports
// =============================================================================

pub use allocator::SequenceAllocator;
pub use config::FacturadorConfig;
pub use context::AppContext;
pub use error::{EngineError, EngineResult};
pub use remote::{HttpSequenceService, NextNumberRequest, RemoteSequence, SequenceService};
pub use tax::{TaxCalculator, TaxConfigBus, TaxRateChanged};
