//! # Money Module
//!
//! Fixed-point amounts in céntimos for printed document totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │    1.005 × 100 = 100.49999999999999                                     │
//! │                                                                         │
//! │  The live form works in f64 (see `tax::igv`). What gets printed on a    │
//! │  factura goes through Money: integer céntimos, rounded half-to-even.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use facturador_core::money::Money;
//!
//! let price = Money::from_centimos(1099); // S/ 10.99
//! let total = price * 3_i64 + Money::from_centimos(500);
//! assert_eq!(total.to_string(), "S/ 37.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::DEFAULT_CURRENCY_SYMBOL;

/// Binary noise below this many decimal places is discarded before rounding.
const SNAP_FACTOR: f64 = 1e6;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in céntimos (1/100 sol).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_centimos(centimos: i64) -> Self {
        Money(centimos)
    }

    /// Converts an f64 amount in soles, rounding half-to-even to the céntimo.
    ///
    /// ## Example
    /// ```rust
    /// use facturador_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(10.994).centimos(), 1099);
    /// assert_eq!(Money::from_amount(1.005).centimos(), 100);  // tie → even
    /// assert_eq!(Money::from_amount(1.015).centimos(), 102);  // tie → even
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        let scaled = (amount * 100.0 * SNAP_FACTOR).round() / SNAP_FACTOR;
        Money(scaled.round_ties_even() as i64)
    }

    #[inline]
    pub const fn centimos(&self) -> i64 {
        self.0
    }

    /// Whole soles (truncated toward zero).
    #[inline]
    pub const fn soles(&self) -> i64 {
        self.0 / 100
    }

    /// Céntimos portion, always 0-99.
    #[inline]
    pub const fn centimos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Back to an f64 amount in soles.
    #[inline]
    pub fn to_amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Formats with an explicit currency symbol: `US$ 12.30`.
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{} {}.{:02}",
            sign,
            symbol,
            self.soles().abs(),
            self.centimos_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the sol symbol. Use [`Money::format_with`] for other currencies.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(DEFAULT_CURRENCY_SYMBOL))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centimos() {
        let money = Money::from_centimos(1099);
        assert_eq!(money.centimos(), 1099);
        assert_eq!(money.soles(), 10);
        assert_eq!(money.centimos_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_centimos(118_000).to_string(), "S/ 1180.00");
        assert_eq!(Money::from_centimos(-550).to_string(), "-S/ 5.50");
        assert_eq!(Money::zero().to_string(), "S/ 0.00");
        assert_eq!(Money::from_centimos(1230).format_with("US$"), "US$ 12.30");
    }

    #[test]
    fn test_from_amount_rounds_half_to_even() {
        assert_eq!(Money::from_amount(180.0).centimos(), 18_000);
        assert_eq!(Money::from_amount(0.125).centimos(), 12);
        assert_eq!(Money::from_amount(0.135).centimos(), 14);
        assert_eq!(Money::from_amount(2.675).centimos(), 268);
        assert_eq!(Money::from_amount(-1.005).centimos(), -100);
    }

    #[test]
    fn test_to_amount() {
        assert_eq!(Money::from_centimos(1180).to_amount(), 11.8);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_centimos(1000);
        let b = Money::from_centimos(500);

        assert_eq!((a + b).centimos(), 1500);
        assert_eq!((a - b).centimos(), 500);
        assert_eq!((a * 3_i64).centimos(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_centimos(100);
        assert_eq!(c.centimos(), 1400);
    }
}
