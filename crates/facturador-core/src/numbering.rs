//! # Document Numbering
//!
//! Formatting and parsing of SUNAT series/correlativo pairs.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       F001-000042                                       │
//! │                       ──── ──────                                       │
//! │                        │     │                                          │
//! │                        │     └── correlativo, zero-padded to 6 digits   │
//! │                        └──────── series, 1-4 ASCII alphanumerics        │
//! │                                                                         │
//! │  Every number this crate produces or accepts matches                    │
//! │      ^[A-Za-z0-9]+-\d{6}$                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_series;
use crate::{MAX_DOCUMENT_NUMBER, NUMBER_WIDTH};

/// A parsed `SERIES-NNNNNN` document number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentNumber {
    pub series: String,
    pub number: u32,
}

impl DocumentNumber {
    /// Builds a document number, checking the series and the number range.
    pub fn new(series: impl Into<String>, number: u32) -> CoreResult<Self> {
        let series = series.into();
        validate_series(&series)?;
        check_range(number as u64)?;
        Ok(DocumentNumber { series, number })
    }

    /// Parses `F001-000042`.
    ///
    /// The numeric part must be exactly six digits; `F001-42` is rejected
    /// even though the value is in range.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let malformed = || CoreError::MalformedDocumentNumber(input.to_string());

        let (series, digits) = input.split_once('-').ok_or_else(malformed)?;

        if series.is_empty() || !series.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(malformed());
        }
        if digits.len() != NUMBER_WIDTH || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let number = digits.parse::<u32>().map_err(|_| malformed())?;

        Ok(DocumentNumber {
            series: series.to_string(),
            number,
        })
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:0width$}", self.series, self.number, width = NUMBER_WIDTH)
    }
}

impl FromStr for DocumentNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentNumber::parse(s)
    }
}

/// Formats `series` and `number` as `SERIES-NNNNNN`.
///
/// ## Example
/// ```rust
/// use facturador_core::numbering::format_document_number;
///
/// assert_eq!(format_document_number("B001", 5).unwrap(), "B001-000005");
/// assert!(format_document_number("B001", 1_000_000).is_err());
/// ```
pub fn format_document_number(series: &str, number: u32) -> CoreResult<String> {
    Ok(DocumentNumber::new(series, number)?.to_string())
}

/// True when `input` has the `SERIES-NNNNNN` shape.
pub fn is_well_formed(input: &str) -> bool {
    DocumentNumber::parse(input).is_ok()
}

fn check_range(number: u64) -> CoreResult<()> {
    if number == 0 || number > MAX_DOCUMENT_NUMBER as u64 {
        return Err(CoreError::NumberOutOfRange {
            number,
            max: MAX_DOCUMENT_NUMBER,
        });
    }
    Ok(())
}
