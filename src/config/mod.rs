//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `AUTOCOLLECT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::time::Duration;

use crate::catalog::StoreCredentials;
use crate::constants::{
    DEFAULT_API_VERSION, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_RATE_LIMIT_BURST,
    DEFAULT_RATE_LIMIT_PER_SEC,
};

/// Origins allowed by CORS when `AUTOCOLLECT_CORS_ORIGINS` is not set.
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `AUTOCOLLECT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Default store domain, used when a request names no store.
    pub shop_domain: Option<String>,

    /// Admin API token for [`Config::shop_domain`].
    pub access_token: Option<String>,

    /// Admin API version. Default: `2025-01`.
    pub api_version: String,

    /// Per-request HTTP timeout and collaborator call bound, in seconds. Default: `30`.
    pub request_timeout_secs: u64,

    /// Token-bucket refill rate per catalog client. Default: `2.0`.
    pub rate_limit_per_sec: f64,

    /// Token-bucket capacity. Default: `2`.
    pub rate_limit_burst: u32,

    /// Allowed CORS origins.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            shop_domain: None,
            access_token: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            rate_limit_per_sec: DEFAULT_RATE_LIMIT_PER_SEC,
            rate_limit_burst: DEFAULT_RATE_LIMIT_BURST,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "AUTOCOLLECT_PORT";
    const ENV_BIND_ADDR: &'static str = "AUTOCOLLECT_BIND_ADDR";
    const ENV_SHOP_DOMAIN: &'static str = "AUTOCOLLECT_SHOP_DOMAIN";
    const ENV_ACCESS_TOKEN: &'static str = "AUTOCOLLECT_ACCESS_TOKEN";
    const ENV_API_VERSION: &'static str = "AUTOCOLLECT_API_VERSION";
    const ENV_REQUEST_TIMEOUT: &'static str = "AUTOCOLLECT_REQUEST_TIMEOUT_SECS";
    const ENV_RATE_LIMIT_PER_SEC: &'static str = "AUTOCOLLECT_RATE_LIMIT_PER_SEC";
    const ENV_RATE_LIMIT_BURST: &'static str = "AUTOCOLLECT_RATE_LIMIT_BURST";
    const ENV_CORS_ORIGINS: &'static str = "AUTOCOLLECT_CORS_ORIGINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let shop_domain = Self::parse_optional_string_from_env(Self::ENV_SHOP_DOMAIN);
        let access_token = Self::parse_optional_string_from_env(Self::ENV_ACCESS_TOKEN);
        let api_version =
            Self::parse_optional_string_from_env(Self::ENV_API_VERSION).unwrap_or(defaults.api_version);
        let request_timeout_secs =
            Self::parse_number_from_env(Self::ENV_REQUEST_TIMEOUT, defaults.request_timeout_secs)?;
        let rate_limit_per_sec =
            Self::parse_number_from_env(Self::ENV_RATE_LIMIT_PER_SEC, defaults.rate_limit_per_sec)?;
        let rate_limit_burst =
            Self::parse_number_from_env(Self::ENV_RATE_LIMIT_BURST, defaults.rate_limit_burst)?;
        let cors_origins = env::var(Self::ENV_CORS_ORIGINS)
            .map(|v| split_origins(&v))
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            port,
            bind_addr,
            shop_domain,
            access_token,
            api_version,
            request_timeout_secs,
            rate_limit_per_sec,
            rate_limit_burst,
            cors_origins,
        })
    }

    /// Checks numeric ranges and that store credentials come in pairs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT,
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        if !(self.rate_limit_per_sec.is_finite() && self.rate_limit_per_sec > 0.0) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RATE_LIMIT_PER_SEC,
                value: self.rate_limit_per_sec.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }

        if self.rate_limit_burst == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RATE_LIMIT_BURST,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        match (&self.shop_domain, &self.access_token) {
            (Some(_), None) => Err(ConfigError::IncompleteStore {
                present: Self::ENV_SHOP_DOMAIN,
                missing: Self::ENV_ACCESS_TOKEN,
            }),
            (None, Some(_)) => Err(ConfigError::IncompleteStore {
                present: Self::ENV_ACCESS_TOKEN,
                missing: Self::ENV_SHOP_DOMAIN,
            }),
            _ => Ok(()),
        }
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credentials for the server-wide default store, if both halves are configured.
    pub fn default_store(&self) -> Option<StoreCredentials> {
        match (&self.shop_domain, &self.access_token) {
            (Some(domain), Some(token)) => Some(StoreCredentials {
                shop_domain: domain.clone(),
                access_token: token.clone(),
                api_version: Some(self.api_version.clone()),
            }),
            _ => None,
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_number_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name,
                    reason: e.to_string(),
                    value,
                }),
            Err(_) => Ok(default),
        }
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
