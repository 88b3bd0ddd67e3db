//! Startup configuration, read once from `ENTRYD_*` environment variables.

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DIRECTORY_URL: &str = "https://sheetdb.io/api/v1/shq898iize5yy";
pub const DEFAULT_ENTRIES_URL: &str = "https://sheetdb.io/api/v1/a778ghwr05c6o";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("banner delay must be greater than 0")]
    ZeroBannerDelay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory sheet (centers, students, profiles)
    pub directory_url: String,
    /// Entries sheet
    pub entries_url: String,
    /// How long the "submitted" banner stays up
    pub banner_ms: u64,
    /// Per-request timeout; `None` waits forever
    pub http_timeout_secs: Option<u64>,
    /// Filter entries by center on the server instead of locally
    pub server_filter: bool,
    /// `tracing-subscriber` filter directive
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            entries_url: DEFAULT_ENTRIES_URL.to_string(),
            banner_ms: 2000,
            http_timeout_secs: None,
            server_filter: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(v) = lookup("ENTRYD_DIRECTORY_URL") {
            config.directory_url = v;
        }
        if let Some(v) = lookup("ENTRYD_ENTRIES_URL") {
            config.entries_url = v;
        }
        if let Some(v) = lookup("ENTRYD_BANNER_MS") {
            config.banner_ms = parse_u64("ENTRYD_BANNER_MS", &v)?;
        }
        if let Some(v) = lookup("ENTRYD_HTTP_TIMEOUT_SECS") {
            if !v.trim().is_empty() {
                config.http_timeout_secs = Some(parse_u64("ENTRYD_HTTP_TIMEOUT_SECS", &v)?);
            }
        }
        if let Some(v) = lookup("ENTRYD_SERVER_FILTER") {
            config.server_filter = parse_bool("ENTRYD_SERVER_FILTER", &v)?;
        }
        if let Some(v) = lookup("ENTRYD_LOG") {
            config.log_filter = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_directory_url(mut self, url: impl Into<String>) -> Self {
        self.directory_url = url.into();
        self
    }

    pub fn with_entries_url(mut self, url: impl Into<String>) -> Self {
        self.entries_url = url.into();
        self
    }

    pub fn with_banner_ms(mut self, ms: u64) -> Self {
        self.banner_ms = ms;
        self
    }

    pub fn with_server_filter(mut self, on: bool) -> Self {
        self.server_filter = on;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory_url.trim().is_empty() {
            return Err(ConfigError::Empty("ENTRYD_DIRECTORY_URL"));
        }
        if self.entries_url.trim().is_empty() {
            return Err(ConfigError::Empty("ENTRYD_ENTRIES_URL"));
        }
        if self.banner_ms == 0 {
            return Err(ConfigError::ZeroBannerDelay);
        }
        Ok(())
    }

    pub fn banner_delay(&self) -> Duration {
        Duration::from_millis(self.banner_ms)
    }
}

fn parse_u64(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
        }),
    }
}
