// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup (after
//! loading `.env` if present) and passed down explicitly. Changing a value
//! requires a restart.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATABASE_PATH` | redb database file | `data/bistro.redb` |
//! | `JWT_ACCESS_SECRET` | Access token signing secret | Required |
//! | `JWT_REFRESH_SECRET` | Refresh token signing secret | Required |
//! | `JWT_EXPIRES_IN` | Access token lifetime (seconds, at most `MAX_TTL_SECS`) | `900` |
//! | `JWT_REFRESH_EXPIRES_IN` | Refresh token lifetime (seconds, at most `MAX_TTL_SECS`) | `604800` |
//! | `JWT_ISSUER` | Token issuer claim | `bistro-server` |
//! | `SESSION_CACHE_CAPACITY` | Max session cache entries | `10000` |
//! | `REQUEST_TIMEOUT_SECS` | Per-request timeout | `60` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::str::FromStr;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";
pub const JWT_ACCESS_SECRET_ENV: &str = "JWT_ACCESS_SECRET";
pub const JWT_REFRESH_SECRET_ENV: &str = "JWT_REFRESH_SECRET";
pub const JWT_EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";
pub const JWT_REFRESH_EXPIRES_IN_ENV: &str = "JWT_REFRESH_EXPIRES_IN";
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";
pub const SESSION_CACHE_CAPACITY_ENV: &str = "SESSION_CACHE_CAPACITY";
pub const REQUEST_TIMEOUT_SECS_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_PATH: &str = "data/bistro.redb";
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 900;
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_ISSUER: &str = "bistro-server";
pub const DEFAULT_SESSION_CACHE_CAPACITY: usize = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Upper bound for token lifetimes (ten years).
pub const MAX_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ")]
    SharedSecret,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Token lifetimes, secrets and issuer used by the auth workflow.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub issuer: String,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("issuer", &self.issuer)
            .finish()
    }
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub auth: AuthSettings,
    pub session_cache_capacity: usize,
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let access_secret = get(JWT_ACCESS_SECRET_ENV).ok_or(ConfigError::Missing(JWT_ACCESS_SECRET_ENV))?;
        let refresh_secret =
            get(JWT_REFRESH_SECRET_ENV).ok_or(ConfigError::Missing(JWT_REFRESH_SECRET_ENV))?;
        if access_secret == refresh_secret {
            return Err(ConfigError::SharedSecret);
        }

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::default(),
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(value) if value.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(value) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    value: value.to_string(),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(get(PORT_ENV), PORT_ENV, DEFAULT_PORT)?,
            database_path: get(DATABASE_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            auth: AuthSettings {
                access_secret,
                refresh_secret,
                access_ttl_secs: parse_ttl(
                    get(JWT_EXPIRES_IN_ENV),
                    JWT_EXPIRES_IN_ENV,
                    DEFAULT_ACCESS_TTL_SECS,
                )?,
                refresh_ttl_secs: parse_ttl(
                    get(JWT_REFRESH_EXPIRES_IN_ENV),
                    JWT_REFRESH_EXPIRES_IN_ENV,
                    DEFAULT_REFRESH_TTL_SECS,
                )?,
                issuer: get(JWT_ISSUER_ENV).unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
            },
            session_cache_capacity: parse_or(
                get(SESSION_CACHE_CAPACITY_ENV),
                SESSION_CACHE_CAPACITY_ENV,
                DEFAULT_SESSION_CACHE_CAPACITY,
            )?,
            request_timeout_secs: parse_or(
                get(REQUEST_TIMEOUT_SECS_ENV),
                REQUEST_TIMEOUT_SECS_ENV,
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            log_format,
        })
    }
}

fn parse_or<T: FromStr>(
    value: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

/// Token lifetime in seconds, within `1..=MAX_TTL_SECS`.
fn parse_ttl(value: Option<String>, name: &'static str, default: i64) -> Result<i64, ConfigError> {
    let raw = value.clone();
    let secs = parse_or(value, name, default)?;
    if (1..=MAX_TTL_SECS).contains(&secs) {
        Ok(secs)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: raw.unwrap_or_else(|| secs.to_string()),
        })
    }
}
