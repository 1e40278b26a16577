//! # Validation Module
//!
//! Input validation for series configuration and tax settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front-end forms                                              │
//! │  └── Immediate feedback (empty series, non-numeric counter)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Series shape (SUNAT: up to 4 alphanumerics)                       │
//! │  ├── Counter range (fits the 6-digit correlativo)                      │
//! │  └── IGV rate/percentage bounds                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote sequence service (authoritative)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_DOCUMENT_NUMBER, MAX_SERIES_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a series prefix.
///
/// ## Rules
/// - Must not be empty
/// - At most 4 characters
/// - ASCII letters and digits only
///
/// ## Example
/// ```rust
/// use facturador_core::validation::validate_series;
///
/// assert!(validate_series("F001").is_ok());
/// assert!(validate_series("").is_err());
/// assert!(validate_series("F-01").is_err());
/// ```
pub fn validate_series(series: &str) -> ValidationResult<()> {
    if series.is_empty() {
        return Err(ValidationError::Required {
            field: "series".to_string(),
        });
    }

    if series.len() > MAX_SERIES_LEN {
        return Err(ValidationError::TooLong {
            field: "series".to_string(),
            max: MAX_SERIES_LEN,
        });
    }

    if !series.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "series".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a local counter value (the next number to hand out).
pub fn validate_counter(counter: u32) -> ValidationResult<()> {
    if counter == 0 || counter > MAX_DOCUMENT_NUMBER {
        return Err(ValidationError::OutOfRange {
            field: "counter".to_string(),
            min: 1,
            max: MAX_DOCUMENT_NUMBER as i64,
        });
    }
    Ok(())
}

/// A rate is persisted as a percentage with two decimals, i.e. whole
/// basis points.
const RATE_BASIS_POINTS: f64 = 10_000.0;

/// Validates an IGV rate expressed as a fraction (0.18).
///
/// Rates above 1.0 are almost always a percentage typed into the wrong
/// field, so they are rejected. So are rates finer than a basis point
/// (0.12345), which the stored percentage could not hold.
pub fn validate_igv_rate(rate: f64) -> ValidationResult<()> {
    if !rate.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "igv_rate".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if rate < 0.0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "igv_rate".to_string(),
        });
    }

    if rate > 1.0 {
        return Err(ValidationError::OutOfRange {
            field: "igv_rate".to_string(),
            min: 0,
            max: 1,
        });
    }

    let basis_points = rate * RATE_BASIS_POINTS;
    if (basis_points - basis_points.round()).abs() > 1e-6 {
        return Err(ValidationError::InvalidFormat {
            field: "igv_rate".to_string(),
            reason: "at most two decimals as a percentage (0.1825 = 18.25%)".to_string(),
        });
    }

    Ok(())
}

/// Validates an IGV percentage as stored in billing configuration (18).
pub fn validate_igv_percent(percent: f64) -> ValidationResult<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "igv_percent".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}
