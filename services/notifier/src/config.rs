//! services/notifier/src/config.rs
//!
//! Defines the notifier's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use chrono_tz::Tz;
use roster_notify_core::PermissionStatus;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which kind of device the notifier pretends to run on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformKind {
    /// Scheduled local alerts are available.
    Desktop,
    /// No scheduled alerts; every schedule call degrades to a no-op.
    Web,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    pub timezone: Tz,
    pub user_id: Option<String>,
    pub platform: PlatformKind,
    /// The answer the console platform gives when asked for permission.
    pub permission: PermissionStatus,
    pub data_dir: PathBuf,
    pub schedule_daily_reminders: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let timezone_str =
            lookup("NOTIFY_TIMEZONE").unwrap_or_else(|| "America/Sao_Paulo".to_string());
        let timezone = timezone_str.parse::<Tz>().map_err(|e| {
            ConfigError::InvalidValue("NOTIFY_TIMEZONE".to_string(), e.to_string())
        })?;

        let user_id = lookup("NOTIFY_USER_ID").filter(|id| !id.trim().is_empty());

        let platform = match lookup("NOTIFY_PLATFORM")
            .unwrap_or_else(|| "desktop".to_string())
            .to_lowercase()
            .as_str()
        {
            "desktop" => PlatformKind::Desktop,
            "web" => PlatformKind::Web,
            other => {
                return Err(ConfigError::InvalidValue(
                    "NOTIFY_PLATFORM".to_string(),
                    format!("'{}' is not one of desktop, web", other),
                ))
            }
        };

        let permission = match lookup("NOTIFY_PERMISSION")
            .unwrap_or_else(|| "granted".to_string())
            .to_lowercase()
            .as_str()
        {
            "granted" => PermissionStatus::Granted,
            "denied" => PermissionStatus::Denied,
            other => {
                return Err(ConfigError::InvalidValue(
                    "NOTIFY_PERMISSION".to_string(),
                    format!("'{}' is not one of granted, denied", other),
                ))
            }
        };

        let data_dir = lookup("NOTIFY_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let schedule_daily_reminders = match lookup("NOTIFY_DAILY_REMINDERS") {
            None => false,
            Some(raw) => raw.parse::<bool>().map_err(|_| {
                ConfigError::InvalidValue(
                    "NOTIFY_DAILY_REMINDERS".to_string(),
                    format!("'{}' is not true or false", raw),
                )
            })?,
        };

        Ok(Self {
            log_level,
            timezone,
            user_id,
            platform,
            permission,
            data_dir,
            schedule_daily_reminders,
        })
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join("events.json")
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.data_dir.join("profiles.json")
    }

    pub fn routines_path(&self) -> PathBuf {
        self.data_dir.join("routines.json")
    }

    pub fn daily_reminders_path(&self) -> PathBuf {
        self.data_dir.join("daily_reminders.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
        assert_eq!(config.user_id, None);
        assert_eq!(config.platform, PlatformKind::Desktop);
        assert_eq!(config.permission, PermissionStatus::Granted);
        assert_eq!(config.routines_path(), PathBuf::from("./data/routines.json"));
        assert!(!config.schedule_daily_reminders);
    }

    #[test]
    fn reads_explicit_values() {
        let config = config_from(&[
            ("NOTIFY_TIMEZONE", "Europe/Lisbon"),
            ("NOTIFY_USER_ID", "user-7"),
            ("NOTIFY_PLATFORM", "Web"),
            ("NOTIFY_PERMISSION", "denied"),
            ("NOTIFY_DATA_DIR", "/tmp/roster"),
            ("NOTIFY_DAILY_REMINDERS", "true"),
        ])
        .unwrap();
        assert_eq!(config.timezone, chrono_tz::Europe::Lisbon);
        assert_eq!(config.user_id.as_deref(), Some("user-7"));
        assert_eq!(config.platform, PlatformKind::Web);
        assert_eq!(config.permission, PermissionStatus::Denied);
        assert_eq!(config.events_path(), PathBuf::from("/tmp/roster/events.json"));
        assert!(config.schedule_daily_reminders);
    }

    #[test]
    fn rejects_unknown_zone_and_platform() {
        assert!(matches!(
            config_from(&[("NOTIFY_TIMEZONE", "Mars/Olympus")]),
            Err(ConfigError::InvalidValue(key, _)) if key == "NOTIFY_TIMEZONE"
        ));
        assert!(matches!(
            config_from(&[("NOTIFY_PLATFORM", "watch")]),
            Err(ConfigError::InvalidValue(key, _)) if key == "NOTIFY_PLATFORM"
        ));
    }
}
