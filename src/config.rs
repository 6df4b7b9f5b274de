//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/meetbook/config.toml`).
//! Every section and field has a default, so a partial file is enough.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Default config file location
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meetbook")
        .join("config.toml")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub booking: BookingSettings,
    pub entry: EntrySettings,
    pub reminder: ReminderSettings,
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for background tasks on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Database URL (e.g., "sqlite://./meetbook.db?mode=rwc")
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://./meetbook.db?mode=rwc".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter directive, overridden by RUST_LOG
    pub level: String,
    /// "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "change-me-in-production".to_string(),
            jwt_issuer: "meetbook".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Length of a booking when the request does not give one
    pub default_duration_minutes: i64,
    /// Increment applied by one extend call
    pub extension_minutes: i64,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            default_duration_minutes: 60,
            extension_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrySettings {
    /// Check-in opens this many minutes before start
    pub lead_minutes: i64,
    /// Check-in closes this many minutes after start
    pub grace_minutes: i64,
}

impl Default for EntrySettings {
    fn default() -> Self {
        Self {
            lead_minutes: 30,
            grace_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub interval_secs: u64,
    /// Remind this many minutes before start
    pub lead_minutes: i64,
    /// Scans run only while `active_start_hour <= hour(UTC) < active_end_hour`
    pub active_start_hour: u32,
    pub active_end_hour: u32,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            lead_minutes: 10,
            active_start_hour: 8,
            active_end_hour: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Figure quoted in reminder copy ("starts in N minutes")
    pub reminder_notice_minutes: i64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            reminder_notice_minutes: 10,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("booking.default_duration_minutes", self.booking.default_duration_minutes),
            ("booking.extension_minutes", self.booking.extension_minutes),
            ("reminder.lead_minutes", self.reminder.lead_minutes),
        ];
        for (name, value) in positive {
            if value <= 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.entry.lead_minutes < 0 || self.entry.grace_minutes < 0 {
            return Err(ConfigError::Invalid(
                "entry windows must not be negative".to_string(),
            ));
        }
        if self.reminder.interval_secs < 60 {
            return Err(ConfigError::Invalid(
                "reminder.interval_secs must be at least 60".to_string(),
            ));
        }
        if self.reminder.active_start_hour >= self.reminder.active_end_hour
            || self.reminder.active_end_hour > 24
        {
            return Err(ConfigError::Invalid(format!(
                "reminder active hours {}..{} are not a valid range",
                self.reminder.active_start_hour, self.reminder.active_end_hour
            )));
        }
        Ok(())
    }
}

impl BookingSettings {
    pub fn default_duration(&self) -> Duration {
        Duration::minutes(self.default_duration_minutes)
    }

    pub fn extension(&self) -> Duration {
        Duration::minutes(self.extension_minutes)
    }
}

impl EntrySettings {
    pub fn lead_window(&self) -> Duration {
        Duration::minutes(self.lead_minutes)
    }

    pub fn grace_window(&self) -> Duration {
        Duration::minutes(self.grace_minutes)
    }
}

impl ReminderSettings {
    pub fn lead(&self) -> Duration {
        Duration::minutes(self.lead_minutes)
    }
}
