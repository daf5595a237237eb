//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: a malformed value stops startup with a clear error
//! instead of silently falling back to a default.

use std::env;

use examcoach_admin::issues::DEFAULT_EVENT_CAPACITY;
use examcoach_admin::jobs::DEFAULT_POLL_INTERVAL_SECS;
use thiserror::Error;

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info,examcoach=debug";

/// Application environment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    /// Parse an `APP_ENV` value. Unrecognized values mean `Development`.
    pub fn from_env_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Returns true if this is production mode.
    #[must_use]
    pub fn is_production(&self) -> bool {
        *self == Self::Production
    }
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse {var}: {source}")]
    InvalidNumber {
        var: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Admin account seeded into the in-memory stores at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapAdmin {
    pub uid: String,
    pub email: Option<String>,
    /// Bearer token accepted for this account.
    pub token: String,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: AppEnvironment,
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub cors_origins: Vec<String>,
    pub sweep_interval_secs: u64,
    pub issue_event_capacity: usize,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Optional Variables
    ///
    /// - `APP_ENV` - `development` (default) or `production`
    /// - `HOST` - Bind address (default: "0.0.0.0")
    /// - `PORT` - Listen port (default: 8080)
    /// - `LOG_FILTER` - Log filter used when `RUST_LOG` is unset
    /// - `CORS_ORIGINS` - Comma-separated allowed origins (default: "*")
    /// - `TESTER_SWEEP_INTERVAL_SECS` - Sweep period (default: 21600)
    /// - `ISSUE_EVENT_CAPACITY` - Issue-created channel size (default: 256)
    /// - `BOOTSTRAP_ADMIN_UID`, `BOOTSTRAP_ADMIN_EMAIL`, `BOOTSTRAP_ADMIN_TOKEN`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value is malformed, or if a bootstrap admin
    /// is requested in production.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let app_env = AppEnvironment::from_env_str(
            &var("APP_ENV").unwrap_or_else(|| "development".to_string()),
        );
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_number(var("PORT"), "PORT", 8080)?;
        let log_filter = var("LOG_FILTER").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let cors_origins = var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let sweep_interval_secs = parse_number(
            var("TESTER_SWEEP_INTERVAL_SECS"),
            "TESTER_SWEEP_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        if sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "TESTER_SWEEP_INTERVAL_SECS".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }

        let issue_event_capacity = parse_number(
            var("ISSUE_EVENT_CAPACITY"),
            "ISSUE_EVENT_CAPACITY",
            DEFAULT_EVENT_CAPACITY,
        )?;
        if issue_event_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                var: "ISSUE_EVENT_CAPACITY".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }

        let bootstrap_admin = match (var("BOOTSTRAP_ADMIN_UID"), var("BOOTSTRAP_ADMIN_TOKEN")) {
            (Some(uid), Some(token)) => Some(BootstrapAdmin {
                uid,
                email: var("BOOTSTRAP_ADMIN_EMAIL"),
                token,
            }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidValue {
                    var: "BOOTSTRAP_ADMIN_UID".to_string(),
                    message: "BOOTSTRAP_ADMIN_UID and BOOTSTRAP_ADMIN_TOKEN must be set together"
                        .to_string(),
                })
            }
        };
        if bootstrap_admin.is_some() && app_env.is_production() {
            return Err(ConfigError::InvalidValue {
                var: "BOOTSTRAP_ADMIN_UID".to_string(),
                message: "Bootstrap admin is not allowed in production".to_string(),
            });
        }

        Ok(Self {
            app_env,
            host,
            port,
            log_filter,
            cors_origins,
            sweep_interval_secs,
            issue_event_capacity,
            bootstrap_admin,
        })
    }

    /// Returns the bind address as "host:port".
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(value: Option<String>, var: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    match value {
        Some(v) => v.trim().parse().map_err(|source| ConfigError::InvalidNumber {
            var: var.to_string(),
            source,
        }),
        None => Ok(default),
    }
}
