//! # Engine Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Engine Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │        Local            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  RemoteUnavail. │  │  Core (MissingCompany,  │ │
//! │  │  InvalidUrl     │  │  RemoteStatus   │  │   validation, range)    │ │
//! │  │  ConfigLoad/Save│  │  MalformedResp. │  │  Store                  │ │
//! │  │                 │  │  Timeout        │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Remote errors stop at the allocator: get_next_number falls back to    │
//! │  the local counter and check_sequences answers false.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use facturador_core::{CoreError, ValidationError};
use facturador_store::StoreError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Everything the allocator, the calculator and their setup can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The sequence service URL is unusable.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The sequence service could not be reached.
    #[error("Sequence service unavailable: {0}")]
    RemoteUnavailable(String),

    /// The sequence service answered with a non-success status.
    #[error("Sequence service returned HTTP {status}")]
    RemoteStatus { status: u16 },

    /// The sequence service answered with a body we can't use.
    #[error("Unexpected sequence service response: {0}")]
    MalformedResponse(String),

    /// The request did not complete in time.
    #[error("Sequence service timed out")]
    Timeout,

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Domain rule violation (missing company, bad series, exhausted counter).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Local store failure.
    #[error("Local storage error: {0}")]
    Store(#[from] StoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EngineError::Timeout
        } else if let Some(status) = err.status() {
            EngineError::RemoteStatus {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            EngineError::MalformedResponse(err.to_string())
        } else {
            EngineError::RemoteUnavailable(err.to_string())
        }
    }
}

impl From<url::ParseError> for EngineError {
    fn from(err: url::ParseError) -> Self {
        EngineError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl EngineError {
    /// Returns true if the error came from talking to the sequence service.
    ///
    /// These are the failures the allocator absorbs.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            EngineError::RemoteUnavailable(_)
                | EngineError::RemoteStatus { .. }
                | EngineError::MalformedResponse(_)
                | EngineError::Timeout
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_)
                | EngineError::InvalidUrl(_)
                | EngineError::ConfigLoadFailed(_)
                | EngineError::ConfigSaveFailed(_)
        )
    }

    /// Returns true for [`CoreError::MissingCompany`].
    pub fn is_missing_company(&self) -> bool {
        matches!(self, EngineError::Core(CoreError::MissingCompany))
    }
}
