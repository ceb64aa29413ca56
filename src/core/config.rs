//! Shell configuration with documented constants
//!
//! Every tunable the pipeline and its collaborators read lives here. A TOML
//! file may override any subset of fields; missing keys keep their defaults.

use crate::core::error::{Result, ShellError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the command pipeline and the system accessors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    // === HISTORY ===
    /// Number of records returned by `history` when the caller gives no limit
    pub history_limit: usize,

    // === SYSTEM ACCESSOR ===
    /// Maximum processes listed by the "process" system command
    pub process_limit: usize,

    /// CPU usage (percent) above which health reports a warning
    pub cpu_warning_percent: f32,

    /// Memory usage (percent) above which health is critical
    ///
    /// Memory exhaustion is the only condition that escalates to CRITICAL.
    pub memory_critical_percent: f32,

    /// Disk usage (percent) above which health reports low disk space
    pub disk_warning_percent: f32,

    /// Seconds between polls of the background system monitor
    pub monitor_interval_secs: u64,

    // === NETWORK ACCESSOR ===
    /// Instant-answer search endpoint
    pub search_endpoint: String,

    /// Results kept from a single search
    pub search_max_results: usize,

    /// Request timeout for searches (seconds)
    pub search_timeout_secs: u64,

    /// Location used when a weather command names none
    pub default_weather_location: String,

    /// URLs fetched by the connectivity check
    pub connectivity_probes: Vec<String>,

    /// Timeout for each connectivity probe (seconds)
    pub probe_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    // === FILE ACCESSOR ===
    /// Largest file `read_file` will load into memory (bytes)
    pub max_read_bytes: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_limit: 10,

            process_limit: 20,
            cpu_warning_percent: 90.0,
            memory_critical_percent: 90.0,
            disk_warning_percent: 90.0,
            monitor_interval_secs: 2,

            search_endpoint: "https://api.duckduckgo.com/".into(),
            search_max_results: 5,
            search_timeout_secs: 10,
            default_weather_location: "London".into(),
            connectivity_probes: vec![
                "https://www.google.com".into(),
                "https://www.cloudflare.com".into(),
                "https://www.github.com".into(),
            ],
            probe_timeout_secs: 5,
            user_agent: "NeuroOS/1.0".into(),

            max_read_bytes: 1024 * 1024,
        }
    }
}

impl ShellConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text, filling missing keys with defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ShellConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ShellError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("cpu_warning_percent", self.cpu_warning_percent),
            ("memory_critical_percent", self.memory_critical_percent),
            ("disk_warning_percent", self.disk_warning_percent),
        ];
        for (name, value) in thresholds {
            if !(value > 0.0 && value <= 100.0) {
                return Err(ShellError::Config(format!(
                    "{} ({}) must be in (0, 100]",
                    name, value
                )));
            }
        }

        if self.history_limit == 0 || self.process_limit == 0 || self.search_max_results == 0 {
            return Err(ShellError::Config(
                "history_limit, process_limit and search_max_results must be positive".into(),
            ));
        }

        if self.connectivity_probes.is_empty() {
            return Err(ShellError::Config(
                "connectivity_probes needs at least one URL".into(),
            ));
        }

        if self.default_weather_location.trim().is_empty() {
            return Err(ShellError::Config(
                "default_weather_location must not be empty".into(),
            ));
        }

        if self.monitor_interval_secs == 0 {
            return Err(ShellError::Config(
                "monitor_interval_secs must be positive".into(),
            ));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<ShellConfig> = OnceLock::new();

/// Get the global shell config (initializes with defaults if not set)
pub fn config() -> &'static ShellConfig {
    CONFIG.get_or_init(ShellConfig::default)
}

/// Set the global shell config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: ShellConfig) -> std::result::Result<(), ShellConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(ShellConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ShellConfig::from_toml_str(
            r#"
            process_limit = 5
            default_weather_location = "Oslo"
            "#,
        )
        .unwrap();

        assert_eq!(config.process_limit, 5);
        assert_eq!(config.default_weather_location, "Oslo");
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.connectivity_probes.len(), 3);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let result = ShellConfig::from_toml_str("cpu_warning_percent = 150.0");
        assert!(matches!(result, Err(ShellError::Config(_))));
    }

    #[test]
    fn test_rejects_empty_probe_list() {
        let config = ShellConfig {
            connectivity_probes: Vec::new(),
            ..ShellConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let shipped = ShellConfig::from_toml_str(include_str!("../../config/neuro-shell.toml"))
            .unwrap();
        assert_eq!(shipped, ShellConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = ShellConfig::from_toml_str("history_limit = \"ten\"");
        assert!(matches!(result, Err(ShellError::Toml(_))));
    }
}
