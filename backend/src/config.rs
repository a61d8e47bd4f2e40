//! Server settings read from the environment.
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `5555`)
//! - `SEED_DEMO_DATA`: `true`/`1`/`yes` inserts the demo data set at startup
//!
//! Backend selection is handled separately by
//! [`RepositoryType::from_env`](crate::db::RepositoryType::from_env).

use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5555;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub seed_demo_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            seed_demo_data: false,
        }
    }
}

fn parse_var<T>(key: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue {
            key,
            reason: e.to_string(),
            value: raw,
        })
}

fn parse_flag(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}

impl ServerConfig {
    /// Read settings from the process environment. Unset variables keep
    /// their defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST")
                .map(|raw| parse_var("HOST", raw))
                .transpose()?
                .unwrap_or(defaults.host),
            port: lookup("PORT")
                .map(|raw| parse_var("PORT", raw))
                .transpose()?
                .unwrap_or(defaults.port),
            seed_demo_data: lookup("SEED_DEMO_DATA")
                .map(|raw| parse_flag("SEED_DEMO_DATA", raw))
                .transpose()?
                .unwrap_or(defaults.seed_demo_data),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
