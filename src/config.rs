//! Configuration module
//!
//! TOML file with one table per concern. Every field has a default, so an
//! empty or missing file is a valid configuration.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::services::ReservationSettings;
use crate::infrastructure::DatabaseConfig;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CAR_RENTAL_CONFIG";

/// Upper bound for `reservations.draft_ttl_minutes` (one year)
pub const MAX_DRAFT_TTL_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub reservations: ReservationSection,
    pub server: ServerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DatabaseConfig::default().url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// EnvFilter directive, e.g. "info" or "car_rental=debug"
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationSection {
    /// Minutes a Draft may wait for confirmation
    pub draft_ttl_minutes: i64,
    /// Seconds between expiry sweeps
    pub expiry_check_interval_secs: u64,
}

impl Default for ReservationSection {
    fn default() -> Self {
        Self {
            draft_ttl_minutes: 60,
            expiry_check_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Seconds to wait for background tasks on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            shutdown_timeout: 30,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url is empty".into()));
        }
        let ttl = self.reservations.draft_ttl_minutes;
        if ttl <= 0 || ttl > MAX_DRAFT_TTL_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "reservations.draft_ttl_minutes must be between 1 and {}, got {}",
                MAX_DRAFT_TTL_MINUTES, ttl
            )));
        }
        if self.reservations.expiry_check_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "reservations.expiry_check_interval_secs must be positive".into(),
            ));
        }
        match self.logging.format.to_lowercase().as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Invalid(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
        }
    }

    pub fn reservation_settings(&self) -> ReservationSettings {
        ReservationSettings {
            draft_ttl: Duration::minutes(
                self.reservations
                    .draft_ttl_minutes
                    .clamp(1, MAX_DRAFT_TTL_MINUTES),
            ),
        }
    }
}

/// `$CAR_RENTAL_CONFIG`, else `<config_dir>/car-rental/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("car-rental")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.reservations.draft_ttl_minutes, 60);
        assert_eq!(cfg.reservation_settings().draft_ttl, Duration::minutes(60));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [reservations]
            draft_ttl_minutes = 15

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.reservations.draft_ttl_minutes, 15);
        assert_eq!(cfg.reservations.expiry_check_interval_secs, 60);
        assert_eq!(cfg.logging.format, "json");
        assert_eq!(cfg.server.shutdown_timeout, 30);
    }

    #[test]
    fn rejects_non_positive_ttl() {
        let err = AppConfig::from_toml("[reservations]\ndraft_ttl_minutes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_ttl_beyond_one_year() {
        for raw in ["9223372036854775807", "1000000000000", "525601"] {
            let doc = format!("[reservations]\ndraft_ttl_minutes = {raw}\n");
            let err = AppConfig::from_toml(&doc).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "accepted {raw}");
        }

        let cfg = AppConfig::from_toml("[reservations]\ndraft_ttl_minutes = 525600\n").unwrap();
        assert_eq!(cfg.reservation_settings().draft_ttl, Duration::days(365));
    }

    #[test]
    fn settings_never_panic_on_unvalidated_ttl() {
        let mut cfg = AppConfig::default();
        cfg.reservations.draft_ttl_minutes = i64::MAX;
        assert_eq!(
            cfg.reservation_settings().draft_ttl,
            Duration::minutes(MAX_DRAFT_TTL_MINUTES)
        );
    }

    #[test]
    fn rejects_unknown_log_format() {
        let err = AppConfig::from_toml("[logging]\nformat = \"yaml\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = AppConfig::from_toml("[database\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("car-rental-{}.toml", uuid::Uuid::new_v4()));
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.database.url, DatabaseConfig::default().url);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!("car-rental-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[database]\nurl = \"sqlite::memory:\"\n").unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.database_config().url, "sqlite::memory:");
    }
}
