//! Configuration and settings management for UARTLink
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in the platform config directory.
//!
//! Configuration is organized into logical sections:
//! - Connection settings (port, baud rate, read timeout)
//! - Console preferences (audit log size, default manual-send value)

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uartlink_communication::{parse_hex_byte, ConnectionParams};
use uartlink_core::constants::{BAUD_RATE, DEFAULT_AUDIT_CAPACITY, DEFAULT_READ_TIMEOUT_MS};

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Last used port
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Receive loop read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl ConnectionSettings {
    /// Parameters for opening the configured port
    pub fn to_params(&self) -> ConnectionParams {
        ConnectionParams::new(self.port.clone())
            .with_baud_rate(self.baud_rate)
            .with_read_timeout_ms(self.read_timeout_ms)
    }
}

/// Operator console preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Audit lines kept in memory
    pub audit_capacity: usize,
    /// Value pre-filled for manual hex send
    pub default_hex: String,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            default_hex: "AA".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Connection settings
    pub connection: ConnectionSettings,
    /// Console preferences
    pub console: ConsoleSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("uartlink").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load config from file, or the defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = Format::from_path(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.connection.baud_rate == 0 {
            return Err(SettingsError::invalid(
                "connection.baud_rate",
                "must be > 0",
            ));
        }

        if !(1..=1000).contains(&self.connection.read_timeout_ms) {
            return Err(SettingsError::invalid(
                "connection.read_timeout_ms",
                "must be between 1 and 1000",
            ));
        }

        if self.console.audit_capacity == 0 {
            return Err(SettingsError::invalid(
                "console.audit_capacity",
                "must be > 0",
            ));
        }

        parse_hex_byte(&self.console.default_hex)
            .map_err(|e| SettingsError::invalid("console.default_hex", e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.baud_rate, 1_000_000);
        assert_eq!(config.connection.read_timeout_ms, 100);
        assert_eq!(config.console.default_hex, "AA");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.connection.port = "/dev/ttyUSB1".to_string();
        config.console.audit_capacity = 50;
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "connection": { "port": "COM4" } }"#).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.connection.port, "COM4");
        assert_eq!(loaded.connection.baud_rate, 1_000_000);
        assert_eq!(loaded.console, ConsoleSettings::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(matches!(
            Config::default().save_to_file(&path),
            Err(SettingsError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.console.default_hex = "ZZ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.connection.read_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.console.audit_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_params() {
        let mut settings = ConnectionSettings::default();
        settings.port = "COM7".to_string();
        let params = settings.to_params();
        assert_eq!(params.port, "COM7");
        assert_eq!(params.baud_rate, 1_000_000);
        assert_eq!(params.read_timeout_ms, 100);
    }
}
