//! # IGV Calculations
//!
//! Pure IGV (Impuesto General a las Ventas) math.
//!
//! ## Two Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Where Rounding Happens                           │
//! │                                                                         │
//! │  igv() / total()            exact f64, no rounding                      │
//! │    │                        (what the form shows while typing)          │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  DocumentTotals::from_lines  rounds to céntimos, half-to-even          │
//! │                              subtotal and IGV rounded separately,       │
//! │                              total = subtotal + IGV so the printed      │
//! │                              figures always add up                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::LineItem;

/// `amount × rate`. No rounding.
///
/// ```rust
/// use facturador_core::tax::igv;
///
/// assert_eq!(igv(1000.0, 0.18), 180.0);
/// ```
#[inline]
pub fn igv(amount: f64, rate: f64) -> f64 {
    amount * rate
}

/// `subtotal + igv(subtotal, rate)`. No rounding.
#[inline]
pub fn total(subtotal: f64, rate: f64) -> f64 {
    subtotal + igv(subtotal, rate)
}

/// 18 → 0.18
#[inline]
pub fn rate_from_percent(percent: f64) -> f64 {
    percent / 100.0
}

/// 0.18 → 18, keeping at most two decimals (0.185 → 18.5).
///
/// Finer rates lose precision here; `validate_igv_rate` rejects them.
pub fn percent_from_rate(rate: f64) -> f64 {
    (rate * 100.0 * 100.0).round() / 100.0
}

// =============================================================================
// Document Totals
// =============================================================================

/// Rounded totals for a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    /// Operaciones gravadas (sum of line totals).
    pub subtotal: Money,
    pub igv: Money,
    pub total: Money,
}

impl DocumentTotals {
    /// Computes the printed totals for `items` at `rate`.
    ///
    /// ## Example
    /// ```rust
    /// use facturador_core::tax::DocumentTotals;
    /// use facturador_core::LineItem;
    ///
    /// let lines = vec![LineItem::new("Servicio", 1.0, 1000.0)];
    /// let totals = DocumentTotals::from_lines(&lines, 0.18);
    /// assert_eq!(totals.igv.centimos(), 18_000);
    /// assert_eq!(totals.total.centimos(), 118_000);
    /// ```
    pub fn from_lines(items: &[LineItem], rate: f64) -> DocumentTotals {
        let raw_subtotal: f64 = items.iter().map(LineItem::line_total).sum();
        let subtotal = Money::from_amount(raw_subtotal);
        let igv = Money::from_amount(igv(subtotal.to_amount(), rate));

        DocumentTotals {
            subtotal,
            igv,
            total: subtotal + igv,
        }
    }
}
