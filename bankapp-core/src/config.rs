//! Configuration management
//!
//! Settings live in `settings.json` in the data directory:
//! ```json
//! {
//!   "rates": { "depositNonReplenishable": "19", "depositReplenishable": "17" },
//!   "auth": { "maxPinAttempts": 3 }
//! }
//! ```
//! Keys this crate does not manage are kept as-is when saving.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::product::DepositRates;
use crate::domain::session::DEFAULT_MAX_PIN_ATTEMPTS;

/// Environment override for the PIN attempt limit
pub const MAX_PIN_ATTEMPTS_ENV: &str = "BANKAPP_MAX_PIN_ATTEMPTS";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    rates: Option<DepositRates>,
    #[serde(default)]
    auth: AuthSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_pin_attempts: Option<u32>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Bank app configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub deposit_rates: DepositRates,
    pub max_pin_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deposit_rates: DepositRates::default(),
            max_pin_attempts: DEFAULT_MAX_PIN_ATTEMPTS,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing file yields defaults. The attempt limit can be overridden
    /// with `BANKAPP_MAX_PIN_ATTEMPTS` (for CI/testing).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings file: {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        let env_attempts = std::env::var(MAX_PIN_ATTEMPTS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok());

        let config = Self {
            deposit_rates: raw.rates.unwrap_or_default(),
            max_pin_attempts: env_attempts
                .or(raw.auth.max_pin_attempts)
                .unwrap_or(DEFAULT_MAX_PIN_ATTEMPTS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to the data directory, preserving unmanaged settings
    ///
    /// Refuses to overwrite a settings file it cannot parse. The file is
    /// replaced atomically.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        self.validate()?;
        let settings_path = data_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content)
                .with_context(|| format!("Invalid settings file: {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        settings.rates = Some(self.deposit_rates);
        settings.auth.max_pin_attempts = Some(self.max_pin_attempts);

        let mut temp = NamedTempFile::new_in(data_dir)?;
        serde_json::to_writer_pretty(&mut temp, &settings)?;
        temp.flush()?;
        temp.persist(&settings_path)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_pin_attempts == 0 {
            anyhow::bail!("auth.maxPinAttempts must be at least 1");
        }
        self.deposit_rates
            .validate()
            .context("Invalid deposit rates in settings")?;
        Ok(())
    }
}
