//! # Domain Types
//!
//! Core domain types used throughout Facturador.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DocumentType   │   │  SequenceState  │   │   TaxConfig     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  facturas       │   │  series "F001"  │   │  igv_rate 0.18  │       │
//! │  │  boletas        │   │  counter 42     │   │  igv_label      │       │
//! │  │  notasCredito   │   └─────────────────┘   │  currency PEN   │       │
//! │  │  notasDebito    │                         │  symbol "S/"    │       │
//! │  │  guiasRemision  │   ┌─────────────────┐   └─────────────────┘       │
//! │  └─────────────────┘   │   CompanyId     │                             │
//! │                        │   LineItem      │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::tax::rate_from_percent;
use crate::{DEFAULT_CURRENCY, DEFAULT_CURRENCY_SYMBOL, DEFAULT_IGV_PERCENT};

// =============================================================================
// Document Type
// =============================================================================

/// The fiscal document types the front-end can issue.
///
/// ## Mapping
/// ```text
/// ┌─────────────────┬────────────────┬────────────┬────────────────┐
/// │ local key       │ remote id      │ SUNAT code │ default series │
/// ├─────────────────┼────────────────┼────────────┼────────────────┤
/// │ facturas        │ invoice        │ 01         │ F001           │
/// │ boletas         │ receipt        │ 03         │ B001           │
/// │ notasCredito    │ credit_note    │ 07         │ FC01           │
/// │ notasDebito     │ debit_note     │ 08         │ FD01           │
/// │ guiasRemision   │ quotation (*)  │ 09         │ T001           │
/// └─────────────────┴────────────────┴────────────┴────────────────┘
/// (*) placeholder, the backend has no remission-guide identifier yet
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    /// Factura electrónica.
    Facturas,
    /// Boleta de venta.
    Boletas,
    /// Nota de crédito.
    NotasCredito,
    /// Nota de débito.
    NotasDebito,
    /// Guía de remisión.
    GuiasRemision,
}

impl DocumentType {
    /// Every document type, in menu order.
    pub const ALL: [DocumentType; 5] = [
        DocumentType::Facturas,
        DocumentType::Boletas,
        DocumentType::NotasCredito,
        DocumentType::NotasDebito,
        DocumentType::GuiasRemision,
    ];

    /// The key used by the front-end and by the local series document.
    pub const fn key(&self) -> &'static str {
        match self {
            DocumentType::Facturas => "facturas",
            DocumentType::Boletas => "boletas",
            DocumentType::NotasCredito => "notasCredito",
            DocumentType::NotasDebito => "notasDebito",
            DocumentType::GuiasRemision => "guiasRemision",
        }
    }

    /// The identifier the remote sequence service expects.
    pub const fn remote_id(&self) -> &'static str {
        match self {
            DocumentType::Facturas => "invoice",
            DocumentType::Boletas => "receipt",
            DocumentType::NotasCredito => "credit_note",
            DocumentType::NotasDebito => "debit_note",
            // TODO: replace once the backend publishes a remission-guide identifier
            DocumentType::GuiasRemision => "quotation",
        }
    }

    /// SUNAT catalog 01 code ("Tipo de documento").
    pub const fn sunat_code(&self) -> &'static str {
        match self {
            DocumentType::Facturas => "01",
            DocumentType::Boletas => "03",
            DocumentType::NotasCredito => "07",
            DocumentType::NotasDebito => "08",
            DocumentType::GuiasRemision => "09",
        }
    }

    /// Series used before the user configures one.
    pub const fn default_series(&self) -> &'static str {
        match self {
            DocumentType::Facturas => "F001",
            DocumentType::Boletas => "B001",
            DocumentType::NotasCredito => "FC01",
            DocumentType::NotasDebito => "FD01",
            DocumentType::GuiasRemision => "T001",
        }
    }

    /// Human-readable name for messages and listings.
    pub const fn display_name(&self) -> &'static str {
        match self {
            DocumentType::Facturas => "Factura",
            DocumentType::Boletas => "Boleta de venta",
            DocumentType::NotasCredito => "Nota de crédito",
            DocumentType::NotasDebito => "Nota de débito",
            DocumentType::GuiasRemision => "Guía de remisión",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|doc_type| doc_type.key() == s)
            .ok_or_else(|| CoreError::UnknownDocumentType(s.to_string()))
    }
}

// =============================================================================
// Company
// =============================================================================

/// Identifier of the company (emisor) documents are numbered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompanyId(String);

impl CompanyId {
    /// Creates a company id, trimming surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Self {
        CompanyId(id.into().trim().to_string())
    }

    /// Returns the id as sent to the remote service.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank id counts as "no active company".
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for CompanyId {
    fn from(id: i64) -> Self {
        CompanyId(id.to_string())
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        CompanyId::new(id)
    }
}

impl From<String> for CompanyId {
    fn from(id: String) -> Self {
        CompanyId::new(id)
    }
}

// =============================================================================
// Sequence State
// =============================================================================

/// Local mirror of one document type's series and next number.
///
/// `counter` is the number the next fallback allocation hands out. It only
/// moves forward on allocation; `update_series` may set it to anything valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SequenceState {
    pub series: String,
    pub counter: u32,
}

impl SequenceState {
    pub fn new(series: impl Into<String>, counter: u32) -> Self {
        SequenceState {
            series: series.into(),
            counter,
        }
    }

    /// Initial state for a document type: its default series, counter 1.
    pub fn initial(doc_type: DocumentType) -> Self {
        SequenceState::new(doc_type.default_series(), 1)
    }
}

// =============================================================================
// Tax Configuration
// =============================================================================

/// Current IGV rate and currency display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TaxConfig {
    /// Decimal fraction (0.18 = 18%).
    pub igv_rate: f64,
    pub igv_label: String,
    pub currency: String,
    pub currency_symbol: String,
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig {
            igv_rate: rate_from_percent(DEFAULT_IGV_PERCENT as f64),
            igv_label: "IGV".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl TaxConfig {
    /// Shallow merge: every field present in `update` replaces the current one.
    pub fn merged(&self, update: &TaxConfigUpdate) -> TaxConfig {
        TaxConfig {
            igv_rate: update.igv_rate.unwrap_or(self.igv_rate),
            igv_label: update
                .igv_label
                .clone()
                .unwrap_or_else(|| self.igv_label.clone()),
            currency: update
                .currency
                .clone()
                .unwrap_or_else(|| self.currency.clone()),
            currency_symbol: update
                .currency_symbol
                .clone()
                .unwrap_or_else(|| self.currency_symbol.clone()),
        }
    }
}

/// Partial [`TaxConfig`] for `update_tax_config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxConfigUpdate {
    pub igv_rate: Option<f64>,
    pub igv_label: Option<String>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
}

impl TaxConfigUpdate {
    /// An update that only changes the rate.
    pub fn rate(igv_rate: f64) -> Self {
        TaxConfigUpdate {
            igv_rate: Some(igv_rate),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.igv_rate.is_none()
            && self.igv_label.is_none()
            && self.currency.is_none()
            && self.currency_symbol.is_none()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// A document line as the form sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        LineItem {
            description: description.into(),
            quantity,
            unit_price,
        }
    }

    /// `quantity × unit_price`, unrounded.
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}
