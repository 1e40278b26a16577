//! # Facturador Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FACTURADOR_API_URL=https://api.example.pe                          │
//! │     FACTURADOR_COMPANY_ID=7                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/facturador/facturador.toml (Linux)                       │
//! │     ~/Library/Application Support/pe.facturador.facturador/... (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost API, 18% IGV, PEN                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://api.example.pe"
//! token = "secret"
//! connect_timeout_secs = 5
//! request_timeout_secs = 10
//!
//! [storage]
//! database_path = "/var/lib/facturador/facturador.db"
//!
//! [billing]
//! igv_percent = 18
//! igv_label = "IGV"
//! currency = "PEN"
//! currency_symbol = "S/"
//!
//! [company]
//! active_id = "7"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use facturador_core::tax::rate_from_percent;
use facturador_core::validation::validate_igv_percent;
use facturador_core::{
    CompanyId, TaxConfig, DEFAULT_CURRENCY, DEFAULT_CURRENCY_SYMBOL, DEFAULT_IGV_PERCENT,
};

use crate::error::{EngineError, EngineResult};

const CONFIG_FILE_NAME: &str = "facturador.toml";
const DATABASE_FILE_NAME: &str = "facturador.db";

// =============================================================================
// API Settings
// =============================================================================

/// Where and how to reach the remote sequence service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL; endpoints are appended (`{base}/api/sequences`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request, if set.
    #[serde(default)]
    pub token: Option<String>,

    /// TCP connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            token: None,
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local store location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// Billing Settings
// =============================================================================

/// Tax defaults used until the billing configuration says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingSettings {
    /// IGV as a percentage (18 = 18%).
    #[serde(default = "default_igv_percent")]
    pub igv_percent: f64,

    #[serde(default = "default_igv_label")]
    pub igv_label: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_igv_percent() -> f64 {
    DEFAULT_IGV_PERCENT as f64
}

fn default_igv_label() -> String {
    "IGV".to_string()
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for BillingSettings {
    fn default() -> Self {
        BillingSettings {
            igv_percent: default_igv_percent(),
            igv_label: default_igv_label(),
            currency: default_currency(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Company Settings
// =============================================================================

/// The company documents are numbered for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySettings {
    /// Active company id. Unset means numbering is refused.
    #[serde(default)]
    pub active_id: Option<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete Facturador configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacturadorConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub billing: BillingSettings,

    #[serde(default)]
    pub company: CompanySettings,
}

impl FacturadorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (facturador.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    /// Returns the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| EngineError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EngineResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EngineError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.connect_timeout_secs == 0 || self.api.request_timeout_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "timeouts must be greater than 0".into(),
            ));
        }

        validate_igv_percent(self.billing.igv_percent)
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;

        Ok(())
    }

    /// Applies `FACTURADOR_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from `lookup` (environment variable name → value).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("FACTURADOR_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(token) = lookup("FACTURADOR_API_TOKEN") {
            self.api.token = Some(token).filter(|t| !t.is_empty());
        }

        if let Some(path) = lookup("FACTURADOR_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(id) = lookup("FACTURADOR_COMPANY_ID") {
            debug!(company_id = %id, "Overriding active company from environment");
            self.company.active_id = Some(id);
        }

        if let Some(percent) = lookup("FACTURADOR_IGV_PERCENT") {
            match percent.trim().parse::<f64>() {
                Ok(p) => self.billing.igv_percent = p,
                Err(_) => warn!(value = %percent, "Ignoring non-numeric FACTURADOR_IGV_PERCENT"),
            }
        }

        if let Some(secs) = lookup("FACTURADOR_REQUEST_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(s) => self.api.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid FACTURADOR_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The SQLite file to open: the configured one, else the platform data
    /// directory, else the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.database_path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    /// The active company, if one is configured and not blank.
    pub fn company_id(&self) -> Option<CompanyId> {
        self.company
            .active_id
            .as_deref()
            .map(CompanyId::new)
            .filter(|id| !id.is_blank())
    }

    /// Tax configuration built from the `[billing]` section.
    pub fn tax_config(&self) -> TaxConfig {
        TaxConfig {
            igv_rate: rate_from_percent(self.billing.igv_percent),
            igv_label: self.billing.igv_label.clone(),
            currency: self.billing.currency.clone(),
            currency_symbol: self.billing.currency_symbol.clone(),
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("pe", "facturador", "facturador")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = FacturadorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.connect_timeout_secs, 5);
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.tax_config(), TaxConfig::default());
        assert!(config.company_id().is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config: FacturadorConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.example.pe"
            token = "abc"

            [billing]
            igv_percent = 10

            [company]
            active_id = "7"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.pe");
        assert_eq!(config.api.token.as_deref(), Some("abc"));
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.billing.igv_percent, 10.0);
        assert_eq!(config.billing.currency, "PEN");
        assert_eq!(config.company_id(), Some(CompanyId::from(7_i64)));
        assert!((config.tax_config().igv_rate - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_config_validation() {
        let mut config = FacturadorConfig::default();

        config.api.base_url = "ftp://example.pe".into();
        assert!(matches!(config.validate(), Err(EngineError::InvalidUrl(_))));

        config.api.base_url = "not a url".into();
        assert!(config.validate().unwrap_err().is_config_error());

        config.api.base_url = "https://example.pe".into();
        config.api.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.api.request_timeout_secs = 10;
        config.billing.igv_percent = 150.0;
        assert!(config.validate().is_err());

        config.billing.igv_percent = 18.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut config = FacturadorConfig::default();
        config.apply_overrides(lookup(&[
            ("FACTURADOR_API_URL", "https://remote.example.pe"),
            ("FACTURADOR_API_TOKEN", "tok"),
            ("FACTURADOR_DB_PATH", "/tmp/f.db"),
            ("FACTURADOR_COMPANY_ID", "12"),
            ("FACTURADOR_IGV_PERCENT", "10"),
            ("FACTURADOR_REQUEST_TIMEOUT_SECS", "3"),
        ]));

        assert_eq!(config.api.base_url, "https://remote.example.pe");
        assert_eq!(config.api.token.as_deref(), Some("tok"));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/f.db"));
        assert_eq!(config.company_id(), Some(CompanyId::from(12_i64)));
        assert_eq!(config.billing.igv_percent, 10.0);
        assert_eq!(config.api.request_timeout_secs, 3);
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("facturador-config-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("facturador.toml");

        let mut config = FacturadorConfig::default();
        config.api.base_url = "https://api.example.pe".into();
        config.billing.igv_percent = 10.0;
        config.company.active_id = Some("7".into());

        assert_eq!(config.save(Some(path.clone())).unwrap(), path);

        let loaded = FacturadorConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.api.base_url, "https://api.example.pe");
        assert_eq!(loaded.billing.igv_percent, 10.0);
        assert_eq!(loaded.company_id(), Some(CompanyId::from(7_i64)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bad_override_values_are_ignored() {
        let mut config = FacturadorConfig::default();
        config.apply_overrides(lookup(&[
            ("FACTURADOR_IGV_PERCENT", "dieciocho"),
            ("FACTURADOR_REQUEST_TIMEOUT_SECS", "-1"),
        ]));

        assert_eq!(config.billing.igv_percent, 18.0);
        assert_eq!(config.api.request_timeout_secs, 10);
    }

    #[test]
    fn test_blank_company_is_no_company() {
        let mut config = FacturadorConfig::default();
        config.company.active_id = Some("   ".into());
        assert!(config.company_id().is_none());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&FacturadorConfig::default()).unwrap();
        assert!(toml_str.contains("[api]"));
        assert!(toml_str.contains("[billing]"));
    }
}
