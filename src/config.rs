//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.skillboard.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "skillboard_report.md".to_string()
}

/// Backend API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the HR backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of attempts per collection before degrading to empty.
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Bearer token for authenticated backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> usize {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the drill-down lists (expiring, orphans) in Markdown output.
    #[serde(default = "default_true")]
    pub include_drilldown: bool,

    /// Include the alerts section in Markdown output.
    #[serde(default = "default_true")]
    pub include_alerts: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_drilldown: true,
            include_alerts: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".skillboard.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }

        if let Some(ref token) = args.token {
            self.api.token = Some(token.clone());
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
