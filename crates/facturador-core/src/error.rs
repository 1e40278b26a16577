//! # Error Types
//!
//! Domain-specific error types for facturador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  facturador-core errors (this file)                                    │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  facturador-store errors (separate crate)                              │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  facturador-engine errors (separate crate)                             │
//! │  └── EngineError      - What callers of the allocator/calculator see   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No company is selected, so no document can be numbered.
    ///
    /// ## User Workflow
    /// ```text
    /// Open "Nueva factura"
    ///      │
    ///      ▼
    /// next number requested with no active company
    ///      │
    ///      ▼
    /// MissingCompany ──► UI asks the user to select/configure a company
    /// ```
    #[error("No hay empresa activa")]
    MissingCompany,

    /// A document-type key outside the fixed enumeration.
    #[error("Unknown document type: {0}")]
    UnknownDocumentType(String),

    /// A number that does not fit the six-digit correlativo.
    #[error("Document number {number} is out of range (1..={max})")]
    NumberOutOfRange { number: u64, max: u32 },

    /// A string that is not `SERIES-NNNNNN`.
    #[error("Malformed document number: '{0}'")]
    MalformedDocumentNumber(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_company_message_is_user_facing() {
        assert_eq!(CoreError::MissingCompany.to_string(), "No hay empresa activa");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "series".to_string(),
        };
        assert_eq!(err.to_string(), "series is required");

        let err = ValidationError::TooLong {
            field: "series".to_string(),
            max: 4,
        };
        assert_eq!(err.to_string(), "series must be at most 4 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustNotBeNegative {
            field: "igv_rate".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
