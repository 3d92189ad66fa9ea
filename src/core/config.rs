use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::core::ledger::LedgerOptions;

/// Overrides the ledger root from the environment.
pub const ROOT_ENV: &str = "USAGE_LEDGER_DIR";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Directory holding the `<YYYY-MM-DD>.json` files.
    pub root: Option<PathBuf>,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
    #[serde(default = "default_stale_lock_secs")]
    pub stale_lock_secs: u64,
    #[serde(default = "default_summary_days")]
    pub summary_days: u32,
}

fn default_lock_timeout_ms() -> u64 {
    5000
}
fn default_stale_lock_secs() -> u64 {
    60
}
fn default_summary_days() -> u32 {
    30
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            root: None,
            lock_timeout_ms: default_lock_timeout_ms(),
            stale_lock_secs: default_stale_lock_secs(),
            summary_days: default_summary_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_level")]
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `usage_ledger=debug`.
    pub filter: Option<String>,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            filter: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub ledger: LedgerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("uledger").join("config.toml")
    }

    /// Default ledger root when neither env nor config names one.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".local")
                    .join("share")
            })
            .join("uledger")
            .join("usage")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Ledger root: explicit override, then `USAGE_LEDGER_DIR`, then config,
    /// then the platform data directory.
    pub fn resolve_root(&self, override_root: Option<PathBuf>) -> PathBuf {
        override_root
            .or_else(|| {
                std::env::var(ROOT_ENV)
                    .ok()
                    .filter(|v| !v.is_empty())
                    .map(PathBuf::from)
            })
            .or_else(|| self.ledger.root.clone())
            .unwrap_or_else(Self::default_root)
    }

    pub fn ledger_options(&self, override_root: Option<PathBuf>) -> LedgerOptions {
        LedgerOptions {
            root: self.resolve_root(override_root),
            lock_timeout: Duration::from_millis(self.ledger.lock_timeout_ms),
            stale_lock: Duration::from_secs(self.ledger.stale_lock_secs),
        }
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if self.ledger.summary_days == 0 {
            issues.push("Invalid summary_days: 0 (must be at least 1)".to_string());
        }
        if self.ledger.lock_timeout_ms == 0 {
            issues.push("Invalid lock_timeout_ms: 0 (must be positive)".to_string());
        }
        if self.ledger.stale_lock_secs == 0 {
            issues.push("Invalid stale_lock_secs: 0 (must be positive)".to_string());
        }
        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            issues.push(format!(
                "Invalid logging level: '{}' (must be trace|debug|info|warn|error)",
                self.logging.level
            ));
        }
        if let Some(root) = &self.ledger.root {
            if root.exists() && !root.is_dir() {
                issues.push(format!("Ledger root is not a directory: {}", root.display()));
            }
        }
        issues
    }
}
