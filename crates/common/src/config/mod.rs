//! Configuration management for scasplens
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with SCASP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values

use crate::index::IndexNaming;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Solver process configuration
    #[serde(default)]
    pub reasoner: ReasonerConfig,

    /// Relevance search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReasonerConfig {
    /// Path to the s(CASP) executable
    #[serde(default = "default_location")]
    pub location: String,

    /// Output-mode flags passed before the answer-count flag
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,

    /// Wall-clock deadline for a single solver invocation, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Naming scheme for nested list indices
    #[serde(default)]
    pub index_naming: IndexNaming,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub json_logging: bool,
}

// Default value functions
fn default_location() -> String { "scasp".to_string() }
fn default_flags() -> Vec<String> { vec!["--human".to_string(), "--tree".to_string()] }
fn default_timeout() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            flags: default_flags(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("reasoner.location", default_location())?
            .set_default("reasoner.timeout_secs", default_timeout())?

            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with SCASP__ prefix
            // e.g., SCASP__REASONER__LOCATION=/usr/local/bin/scasp
            .add_source(
                Environment::with_prefix("SCASP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific configuration file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("SCASP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the solver deadline as Duration
    pub fn reasoner_timeout(&self) -> Duration {
        Duration::from_secs(self.reasoner.timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reasoner: ReasonerConfig::default(),
            search: SearchConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.reasoner.location, "scasp");
        assert_eq!(config.reasoner.flags, vec!["--human", "--tree"]);
        assert_eq!(config.reasoner_timeout(), Duration::from_secs(60));
        assert_eq!(config.search.index_naming, IndexNaming::Numbered);
        assert!(!config.observability.json_logging);
    }

    #[test]
    fn test_from_file_fills_missing_sections() {
        let dir = std::env::temp_dir().join(format!("scasplens-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[reasoner]\nlocation = \"/opt/scasp/bin/scasp\"\ntimeout_secs = 5"
        )
        .unwrap();

        let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.reasoner.location, "/opt/scasp/bin/scasp");
        assert_eq!(config.reasoner_timeout(), Duration::from_secs(5));
        assert_eq!(config.reasoner.flags, vec!["--human", "--tree"]);
        assert_eq!(config.observability.log_level, "info");

        std::fs::remove_dir_all(&dir).ok();
    }
}
