// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! parsed [`Config`] used throughout the application. Configuration is loaded
//! from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | HMAC secret used to sign tokens (at least 32 bytes) | Random per process |
//! | `TOKEN_TTL_SECS` | Token lifetime in seconds (at most one year) | `43200` |
//! | `LOGIN_STRATEGY` | Login entry point (`handler` or `filter`) | `handler` |
//! | `STORE_TIMEOUT_MS` | Timeout for each user store lookup | `5000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{str::FromStr, time::Duration};

use thiserror::Error;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the token signing secret.
///
/// When unset, a random secret is generated at startup and every token is
/// invalidated by a restart.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const LOGIN_STRATEGY_ENV: &str = "LOGIN_STRATEGY";
pub const STORE_TIMEOUT_ENV: &str = "STORE_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 12 * 60 * 60;
/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// HS256 keys shorter than the hash output weaken the MAC.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("JWT_SECRET must be at least 32 bytes long")]
    SecretTooShort,
}

/// Which login entry point is mounted.
///
/// Exactly one is active for a given router: the interceptor answers
/// `POST /login` before routing, the handler is a regular route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoginStrategy {
    /// Dedicated `POST /login` route handler.
    #[default]
    Handler,
    /// Pipeline interceptor that consumes `POST /login` before routing.
    Filter,
}

impl FromStr for LoginStrategy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "handler" => Ok(LoginStrategy::Handler),
            "filter" => Ok(LoginStrategy::Filter),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(()),
        }
    }
}

/// Settings consumed by the authentication pipeline.
#[derive(Clone)]
pub struct AuthSettings {
    /// Signing secret; `None` means one is generated at startup.
    pub jwt_secret: Option<Vec<u8>>,
    pub token_ttl: chrono::Duration,
    pub login_strategy: LoginStrategy,
    pub store_timeout: Duration,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl", &self.token_ttl)
            .field("login_strategy", &self.login_strategy)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl: chrono::Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            login_strategy: LoginStrategy::default(),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}

/// Complete process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub auth: AuthSettings,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, PORT_ENV, DEFAULT_PORT)?;

        let jwt_secret = match lookup(JWT_SECRET_ENV) {
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                return Err(ConfigError::SecretTooShort)
            }
            Some(secret) => Some(secret.into_bytes()),
            None => None,
        };

        let ttl_secs: i64 = parse_or(&lookup, TOKEN_TTL_ENV, DEFAULT_TOKEN_TTL_SECS)?;
        let token_ttl = chrono::Duration::try_seconds(ttl_secs)
            .filter(|_| (1..=MAX_TOKEN_TTL_SECS).contains(&ttl_secs))
            .ok_or_else(|| ConfigError::InvalidValue {
                var: TOKEN_TTL_ENV,
                value: ttl_secs.to_string(),
            })?;

        let store_timeout_ms = parse_or(&lookup, STORE_TIMEOUT_ENV, DEFAULT_STORE_TIMEOUT_MS)?;

        Ok(Self {
            host,
            port,
            log_format: parse_or(&lookup, LOG_FORMAT_ENV, LogFormat::default())?,
            auth: AuthSettings {
                jwt_secret,
                token_ttl,
                login_strategy: parse_or(&lookup, LOGIN_STRATEGY_ENV, LoginStrategy::default())?,
                store_timeout: Duration::from_millis(store_timeout_ms),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|_| ConfigError::InvalidValue { var, value })
        }
        None => Ok(default),
    }
}
