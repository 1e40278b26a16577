//! # facturador-core: Pure Business Logic for Facturador
//!
//! Document numbering and IGV math for SUNAT (Peru) electronic invoicing,
//! written as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Facturador Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Front-end (invoice / note forms)                │   │
//! │  │    open form ──► next number    edit lines ──► IGV + total      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        facturador-engine (SequenceAllocator, TaxCalculator)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ facturador-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ numbering │  │    tax    │  │   money   │  │   │
//! │  │   │ DocType   │  │ F001-     │  │ IGV math  │  │ céntimos  │  │   │
//! │  │   │ TaxConfig │  │  000042   │  │ totals    │  │ rounding  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (DocumentType, SequenceState, TaxConfig, LineItem)
//! - [`numbering`] - `SERIES-NNNNNN` formatting and parsing
//! - [`tax`] - IGV and document totals
//! - [`money`] - Fixed-point céntimos for printed totals
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use facturador_core::numbering::format_document_number;
//! use facturador_core::tax;
//!
//! assert_eq!(format_document_number("F001", 42).unwrap(), "F001-000042");
//! assert_eq!(tax::igv(1000.0, 0.18), 180.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use numbering::DocumentNumber;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Width of the numeric part of a document number (`F001-000042`).
pub const NUMBER_WIDTH: usize = 6;

/// Largest number that fits in [`NUMBER_WIDTH`] digits.
pub const MAX_DOCUMENT_NUMBER: u32 = 999_999;

/// Maximum length of a series prefix.
///
/// SUNAT series are four characters (`F001`, `B001`, `FC01`, `T001`).
pub const MAX_SERIES_LEN: usize = 4;

/// IGV percentage used when nothing has been configured yet.
pub const DEFAULT_IGV_PERCENT: u32 = 18;

/// Default currency code (Peruvian sol).
pub const DEFAULT_CURRENCY: &str = "PEN";

/// Display glyph for [`DEFAULT_CURRENCY`].
pub const DEFAULT_CURRENCY_SYMBOL: &str = "S/";
