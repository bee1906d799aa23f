//! Application settings.
//!
//! Settings start from compiled defaults and are then overridden by
//! `TASKLY_*` environment variables. Tests inject their own lookup function
//! through [`AppConfig::from_lookup`] instead of mutating the process
//! environment.

use crate::task::domain::SlugPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Environment variable holding the listen address.
pub const BIND_ADDR_VAR: &str = "TASKLY_BIND_ADDR";
/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "TASKLY_DATABASE_URL";
/// Environment variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "TASKLY_DB_POOL_SIZE";
/// Environment variable selecting the slug normalization policy.
pub const SLUG_POLICY_VAR: &str = "TASKLY_SLUG_POLICY";
/// Environment variable holding the login page location.
pub const LOGIN_URL_VAR: &str = "TASKLY_LOGIN_URL";
/// Environment variable naming the header that carries the owner id.
pub const OWNER_HEADER_VAR: &str = "TASKLY_OWNER_HEADER";
/// Environment variable holding the tracing filter directive.
pub const LOG_FILTER_VAR: &str = "TASKLY_LOG";

/// Errors raised while reading settings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed.
    #[error("invalid value for {variable}: {value:?} ({reason})")]
    InvalidValue {
        /// Offending variable name.
        variable: &'static str,
        /// Raw value found in the environment.
        value: String,
        /// Parser message.
        reason: String,
    },
}

impl ConfigError {
    fn invalid(variable: &'static str, value: &str, reason: &impl fmt::Display) -> Self {
        Self::InvalidValue {
            variable,
            value: value.to_owned(),
            reason: reason.to_string(),
        }
    }
}

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,
    /// `PostgreSQL` URL; `None` selects the in-memory repository.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_size: u32,
    /// Slug normalization policy for new tasks.
    pub slug_policy: SlugPolicy,
    /// Location unauthenticated page requests are redirected to.
    pub login_url: String,
    /// Request header carrying the authenticated owner's UUID.
    pub owner_header: String,
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            database_url: None,
            pool_size: 8,
            slug_policy: SlugPolicy::default(),
            login_url: "/accounts/login/".to_owned(),
            owner_header: "x-owner-id".to_owned(),
            log_filter: "info".to_owned(),
        }
    }
}

impl AppConfig {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings using `lookup` to resolve variable names.
    ///
    /// Unset and blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable holds an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = read(BIND_ADDR_VAR) {
            config.bind_addr = value
                .parse()
                .map_err(|err| ConfigError::invalid(BIND_ADDR_VAR, &value, &err))?;
        }
        if let Some(value) = read(DATABASE_URL_VAR) {
            config.database_url = Some(value);
        }
        if let Some(value) = read(POOL_SIZE_VAR) {
            config.pool_size = match value.parse::<u32>() {
                Ok(0) => {
                    return Err(ConfigError::invalid(
                        POOL_SIZE_VAR,
                        &value,
                        &"must be positive",
                    ));
                }
                Ok(size) => size,
                Err(err) => return Err(ConfigError::invalid(POOL_SIZE_VAR, &value, &err)),
            };
        }
        if let Some(value) = read(SLUG_POLICY_VAR) {
            config.slug_policy = value
                .parse()
                .map_err(|err| ConfigError::invalid(SLUG_POLICY_VAR, &value, &err))?;
        }
        if let Some(value) = read(LOGIN_URL_VAR) {
            config.login_url = value;
        }
        if let Some(value) = read(OWNER_HEADER_VAR) {
            config.owner_header = value.to_ascii_lowercase();
        }
        if let Some(value) = read(LOG_FILTER_VAR) {
            config.log_filter = value;
        }

        Ok(config)
    }
}
