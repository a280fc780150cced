//! Configuration infrastructure
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Built-in defaults (`AppConfig::default()`)
//! 2. `config/default.*` and `config/{APP_ENV}.*` next to the working directory (both optional)
//! 3. Environment variables `PAGE_VALIDATION_<SECTION>__<KEY>`
//! 4. `SLACK_WEBHOOK_URL`, only when no webhook URL was configured otherwise

#![allow(clippy::uninlined_format_args)]

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::http_client::HttpClientConfig;

pub const ENV_PREFIX: &str = "PAGE_VALIDATION";
pub const LEGACY_WEBHOOK_ENV: &str = "SLACK_WEBHOOK_URL";
pub const APP_DIR_NAME: &str = "page-validation-widget";

/// Default values shared by `Default` impls and documentation
pub mod defaults {
    pub const SITE_BASE_URL: &str = "https://wbg-itss-sandbox-913.atlassian.net";
    pub const API_BASE_URL: &str = "https://wbg-itss-sandbox-913.atlassian.net";
    pub const DATABASE_FILE: &str = "validation.db";
    pub const UTC_OFFSET_MINUTES: i32 = 0;
    pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;
    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "page-validation.log";
    pub const MAX_OPEN_INSTANCES: usize = 512;
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: HostApiConfig,
    pub notification: NotificationConfig,
    pub storage: StorageConfig,
    pub http: HttpClientConfig,
    pub display: DisplayConfig,
    pub widget: WidgetConfig,
    pub logging: LoggingConfig,
}

/// Host platform endpoints and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostApiConfig {
    /// Root the REST paths (`/wiki/api/v2/...`, `/wiki/rest/api/...`) are appended to
    pub api_base_url: String,

    /// Root used when building viewable page links
    pub site_base_url: String,

    /// Account email for basic auth together with `api_token`
    pub auth_email: Option<String>,

    /// API token; basic auth with `auth_email`, bearer auth on its own
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Webhook receiving validation requests
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// `sqlite:` URL; defaults to a file under the local data directory
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Offset from UTC used when rendering "Last validated on ..." strings
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Widget controllers kept in memory before the least recently used is dropped
    pub max_open_instances: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` under the data directory
    pub log_dir: Option<PathBuf>,

    /// Module-specific log level filters (e.g., "sqlx": "warn", "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

impl Default for HostApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::API_BASE_URL.to_string(),
            site_base_url: defaults::SITE_BASE_URL.to_string(),
            auth_email: None,
            api_token: None,
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            max_open_instances: defaults::MAX_OPEN_INSTANCES,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: defaults::UTC_OFFSET_MINUTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("sqlx".to_string(), "warn".to_string());
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl DisplayConfig {
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

impl StorageConfig {
    /// Resolved SQLite URL, falling back to the per-user data directory.
    pub fn resolved_database_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.database_url {
            return Ok(url.clone());
        }
        let path = app_data_dir()?.join(defaults::DATABASE_FILE);
        Ok(format!("sqlite:{}", path.display()))
    }
}

/// `<local data dir>/page-validation-widget`
pub fn app_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| ConfigError::Validation {
            message: "Could not determine local data directory".to_string(),
        })
}

impl AppConfig {
    /// Load using the standard search path (`config/default`, `config/{APP_ENV}`).
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let builder = Self::base_builder()?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        Self::finish(builder)
    }

    /// Load with an explicit configuration file layered over the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let builder = Self::base_builder()?.add_source(config::File::from(path));
        Self::finish(builder)
    }

    fn base_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = config::Config::try_from(&Self::default())?;
        Ok(config::Config::builder().add_source(defaults))
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        if config.notification.webhook_url.is_none() {
            config.notification.webhook_url = std::env::var(LEGACY_WEBHOOK_ENV).ok().filter(|v| !v.is_empty());
            if config.notification.webhook_url.is_some() {
                debug!("Webhook URL taken from {}", LEGACY_WEBHOOK_ENV);
            }
        }
        config.validate()?;

        info!(
            "🔧 Configuration loaded: site_base_url={}, webhook configured={}, storage={:?}",
            config.host.site_base_url,
            config.notification.webhook_url.is_some(),
            config.storage.backend
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("host.api_base_url", &self.host.api_base_url)?;
        check_url("host.site_base_url", &self.host.site_base_url)?;
        if let Some(webhook) = &self.notification.webhook_url {
            check_url("notification.webhook_url", webhook)?;
        }

        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "http.timeout_seconds must be greater than 0".to_string(),
            });
        }

        if self.display.utc_offset_minutes.abs() > defaults::MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::Validation {
                message: format!(
                    "display.utc_offset_minutes must be within ±{} (got {})",
                    defaults::MAX_UTC_OFFSET_MINUTES,
                    self.display.utc_offset_minutes
                ),
            });
        }

        if self.widget.max_open_instances == 0 {
            return Err(ConfigError::Validation {
                message: "widget.max_open_instances must be greater than 0".to_string(),
            });
        }

        if self.host.auth_email.is_some() && self.host.api_token.is_none() {
            return Err(ConfigError::Validation {
                message: "host.auth_email requires host.api_token".to_string(),
            });
        }

        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value).map(|_| ()).map_err(|e| ConfigError::Validation {
        message: format!("{} is not a valid URL ({}): {}", field, value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.display.offset(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_invalid_webhook_rejected() {
        let mut config = AppConfig::default();
        config.notification.webhook_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.display.utc_offset_minutes = 15 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_instance_limit_rejected() {
        let mut config = AppConfig::default();
        config.widget.max_open_instances = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_email_without_token_rejected() {
        let mut config = AppConfig::default();
        config.host.auth_email = Some("me@example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[host]
site_base_url = "https://docs.example.com"

[notification]
webhook_url = "https://hooks.example.com/T000/B000"

[storage]
backend = "memory"

[display]
utc_offset_minutes = 540
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host.site_base_url, "https://docs.example.com");
        assert_eq!(config.host.api_base_url, defaults::API_BASE_URL);
        assert_eq!(
            config.notification.webhook_url.as_deref(),
            Some("https://hooks.example.com/T000/B000")
        );
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.display.offset(), FixedOffset::east_opt(9 * 3600).unwrap());
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let storage = StorageConfig {
            backend: StorageBackend::Sqlite,
            database_url: Some("sqlite::memory:".to_string()),
        };
        assert_eq!(storage.resolved_database_url().unwrap(), "sqlite::memory:");
    }
}
