//! Configuration management for tallybook
//!
//! Loads and validates the YAML settings the engine consumes: where the
//! ledger lives and how it is segmented, the account list and display
//! aliases, per-category budgets, and logging.

pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigErrorCode, ConfigErrorDetails, ConfigResult};

// ==================== Configuration Types ====================

/// Block segmentation policy for the primary parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationMode {
    /// New block at every dated line
    #[default]
    DateLine,
    /// Blocks separated by blank lines
    BlankLine,
}

impl std::str::FromStr for SegmentationMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "date_line" | "date" => Ok(SegmentationMode::DateLine),
            "blank_line" | "blank" => Ok(SegmentationMode::BlankLine),
            _ => Err(format!("Invalid segmentation mode: {}", s)),
        }
    }
}

impl std::fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentationMode::DateLine => write!(f, "date_line"),
            SegmentationMode::BlankLine => write!(f, "blank_line"),
        }
    }
}

/// Ledger file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the ledger text file
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub strategy: SegmentationMode,
    /// Report skipped blocks instead of dropping them silently
    #[serde(default)]
    pub collect_diagnostics: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            strategy: SegmentationMode::default(),
            collect_diagnostics: false,
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("./ledger.txt")
}

/// Account options and display aliases
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccountsConfig {
    /// Canonical account paths offered to entry tooling
    #[serde(default)]
    pub options: Vec<String>,
    /// Display alias -> canonical account path
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

/// Recurring rule storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringConfig {
    #[serde(default = "default_rules_file")]
    pub rules_file: PathBuf,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            rules_file: default_rules_file(),
        }
    }
}

fn default_rules_file() -> PathBuf {
    PathBuf::from("./recurring.json")
}

/// Defaults for new entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    /// Expense category -> spending limit
    #[serde(default)]
    pub budgets: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub recurring: RecurringConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError { message: e.to_string() })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of {}", LOG_LEVELS.join(", ")),
            });
        }

        let currency = &self.defaults.currency;
        if currency.is_empty() || !currency.chars().all(char::is_alphanumeric) {
            return Err(ConfigError::InvalidValue {
                field: "defaults.currency".to_string(),
                reason: "Currency must be a non-empty alphanumeric code".to_string(),
            });
        }

        for (category, limit) in &self.budgets {
            if limit.is_sign_negative() {
                return Err(ConfigError::InvalidValue {
                    field: format!("budgets.{}", category),
                    reason: "Budget limit must not be negative".to_string(),
                });
            }
        }

        for (alias, target) in &self.accounts.aliases {
            if target.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("accounts.aliases.{}", alias),
                    reason: "Alias target must be a canonical account path".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}
