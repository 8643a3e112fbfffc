//! Configuration management for the Culex service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::CulexError;
use crate::grain::ProviderOptions;
use crate::models::WeatherForecast;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the Culex service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CulexConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Forecast provider configuration
    pub provider: ProviderConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Upper bound for one forwarded call in milliseconds
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,
    /// Number of calls the provider mailbox buffers
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Forecasts served by the provider, in response order
    #[serde(default)]
    pub forecasts: Vec<ForecastEntry>,
}

/// One configured forecast record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub temperature_c: i32,
    #[serde(default)]
    pub summary: Option<String>,
}

impl From<&ForecastEntry> for WeatherForecast {
    fn from(entry: &ForecastEntry) -> Self {
        WeatherForecast::new(entry.date, entry.temperature_c, entry.summary.clone())
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_call_timeout() -> u64 {
    5000
}

fn default_mailbox_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout(),
            mailbox_capacity: default_mailbox_capacity(),
            forecasts: Vec::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ProviderConfig {
    /// Actor runtime options derived from this section
    #[must_use]
    pub fn options(&self) -> ProviderOptions {
        ProviderOptions {
            mailbox_capacity: self.mailbox_capacity,
            call_timeout: Duration::from_millis(self.call_timeout_ms),
        }
    }

    /// Configured forecasts, in configured order
    #[must_use]
    pub fn forecasts(&self) -> Vec<WeatherForecast> {
        self.forecasts.iter().map(WeatherForecast::from).collect()
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl CulexConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. CULEX_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("CULEX")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CulexConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("culex").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.provider.call_timeout_ms == 0 {
            self.provider.call_timeout_ms = default_call_timeout();
        }
        if self.provider.mailbox_capacity == 0 {
            self.provider.mailbox_capacity = default_mailbox_capacity();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.provider.call_timeout_ms > 60_000 {
            return Err(
                CulexError::config("Provider call timeout cannot exceed 60000 ms").into(),
            );
        }

        if self.provider.mailbox_capacity > 10_000 {
            return Err(
                CulexError::config("Provider mailbox capacity cannot exceed 10000").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CulexError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CulexError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.server.host.contains(char::is_whitespace) {
            return Err(CulexError::config("Server host cannot contain whitespace").into());
        }

        Ok(())
    }
}
