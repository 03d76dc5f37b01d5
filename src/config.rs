//! Service configuration, read from environment variables.
//!
//! - `STORE_BACKEND` - `postgres` (default) or `memory`
//! - `DATABASE_URL` - required for the `postgres` backend
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 5)
//! - `RUN_MIGRATIONS` - apply embedded migrations at startup (default: true)
//! - `JWT_SECRET` - HS256 secret for bearer tokens (required)
//! - `HOST` - bind address (default: 127.0.0.1)
//! - `PORT` - first port to try (default: 3000)

use std::net::IpAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Postgres { url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub backend: StoreBackend,
    pub run_migrations: bool,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));
        let invalid = |key: &str, value: &str| ConfigError::InvalidEnvVar(key.to_string(), value.to_string());

        let host: IpAddr = match lookup("HOST") {
            Some(raw) => raw.parse().map_err(|_| invalid("HOST", &raw))?,
            None => IpAddr::from([127, 0, 0, 1]),
        };
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| invalid("PORT", &raw))?,
            None => 3000,
        };

        let backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => {
                let max_connections: u32 = match lookup("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => raw.parse().map_err(|_| invalid("DATABASE_MAX_CONNECTIONS", &raw))?,
                    None => 5,
                };
                StoreBackend::Postgres {
                    url: required("DATABASE_URL")?,
                    max_connections,
                }
            }
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(invalid("STORE_BACKEND", other)),
        };

        let run_migrations = match lookup("RUN_MIGRATIONS").as_deref() {
            None | Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => return Err(invalid("RUN_MIGRATIONS", other)),
        };

        Ok(Self {
            host,
            port,
            backend,
            run_migrations,
            jwt_secret: required("JWT_SECRET")?,
        })
    }
}
