//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::AlertPriority;
use clap::Parser;
use std::path::PathBuf;

/// Skillboard - team knowledge dashboard CLI
///
/// Fetches employees, the knowledge catalog, and employee-knowledge links
/// from an HR backend and generates a dashboard analytics report.
///
/// Examples:
///   skillboard --base-url http://localhost:3000
///   skillboard --base-url https://hr.example.com/api --format json -o dashboard.json
///   skillboard --fail-on high
///   skillboard --dry-run
///   skillboard --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the HR backend API
    ///
    /// Can also be set via SKILLBOARD_API_URL env var or .skillboard.toml config.
    #[arg(short, long, value_name = "URL", env = "SKILLBOARD_API_URL")]
    pub base_url: Option<String>,

    /// Bearer token for authenticated backends
    #[arg(long, value_name = "TOKEN", env = "SKILLBOARD_API_TOKEN")]
    pub token: Option<String>,

    /// Output file path for the report
    ///
    /// Defaults to the config file setting, or skillboard_report.md.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .skillboard.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if alerts at or above this priority are emitted
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is met.
    /// Values: high, medium, low
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Dry run: fetch the collections and print their counts without
    /// computing or writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .skillboard.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Alert priority threshold for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Low,
    Medium,
    High,
}

impl From<FailOnLevel> for AlertPriority {
    fn from(level: FailOnLevel) -> Self {
        match level {
            FailOnLevel::Low => AlertPriority::Low,
            FailOnLevel::Medium => AlertPriority::Medium,
            FailOnLevel::High => AlertPriority::High,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate backend URL format when provided on the CLI
        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            base_url: Some("http://localhost:3000".to_string()),
            token: None,
            output: None,
            format: OutputFormat::Markdown,
            config: None,
            timeout: None,
            verbose: false,
            quiet: false,
            fail_on: None,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.base_url = Some("localhost:3000".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.base_url = Some("not-a-url".to_string());
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_fail_on_maps_to_alert_priority() {
        assert_eq!(AlertPriority::from(FailOnLevel::Low), AlertPriority::Low);
        assert_eq!(AlertPriority::from(FailOnLevel::High), AlertPriority::High);
    }
}
