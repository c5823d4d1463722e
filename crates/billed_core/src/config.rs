//! Configuration types for Billed.

use crate::error::{BilledError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default reimbursement percentage applied when the pct field is empty.
pub const DEFAULT_PCT: u32 = 20;

/// Receipt extensions accepted by the new-bill form.
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Comprehensive configuration for a Billed data directory.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Receipt handling configuration.
    #[serde(default)]
    pub receipts: ReceiptConfig,

    /// New-bill form configuration.
    #[serde(default)]
    pub form: FormConfig,

    /// Bills service configuration.
    #[serde(default)]
    pub service: ServiceConfig,
}

impl Config {
    /// Load configuration from `config.toml` in the data directory.
    ///
    /// A missing file yields the defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.toml");
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| BilledError::ConfigError(format!("failed to read config: {}", e)))?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| BilledError::ConfigError(format!("failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to `config.toml` in the data directory.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join("config.toml");
        let content = toml::to_string_pretty(self)
            .map_err(|e| BilledError::ConfigError(format!("failed to serialize config: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| BilledError::ConfigError(format!("failed to write config: {}", e)))?;
        Ok(())
    }

    /// Rejects values the form cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.receipts.allowed_extensions.is_empty() {
            return Err(BilledError::ConfigError(
                "receipts.allowed_extensions must not be empty".to_string(),
            ));
        }
        if self.form.default_pct == 0 || self.form.default_pct > 100 {
            return Err(BilledError::ConfigError(format!(
                "form.default_pct must be in 1..=100, got {}",
                self.form.default_pct
            )));
        }
        Ok(())
    }
}

/// Receipt handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptConfig {
    /// Extensions accepted by the form, compared case-insensitively
    /// (default: jpg, jpeg, png).
    pub allowed_extensions: Vec<String>,

    /// Largest receipt the local store accepts, in bytes (default: 10 MB).
    pub max_size_bytes: usize,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_size_bytes: 10 * 1024 * 1024,
        }
    }
}

/// New-bill form configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormConfig {
    /// Percentage used when the pct field is left empty (default: 20).
    pub default_pct: u32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_pct: DEFAULT_PCT,
        }
    }
}

/// Bills service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServiceConfig {
    /// Base URL prefixed to stored receipt paths.
    /// When unset, the local store hands out `file://` URLs.
    pub public_base_url: Option<String>,
}
