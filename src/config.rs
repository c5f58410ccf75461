//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Parsing is a pure function over a key lookup so it can be exercised with a
//! plain map in tests; `from_env` just plugs in the process environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_TOKEN_FILE: &str = ".reportdesk/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 15;

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL is not an absolute `http`/`https` URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),
}

/// What a failed profile refresh does to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// Any refresh failure is an implicit logout.
    #[default]
    LogoutOnAnyFailure,
    /// Only a rejected credential logs out; transport failures keep the session.
    LogoutOnRejection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Overall deadline for ordinary API requests.
    pub request: Duration,
    /// TCP/TLS connect deadline.
    pub connect: Duration,
    /// Deadline for login, register and profile fetch.
    pub auth: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            auth: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub token_file: PathBuf,
    pub timeouts: Timeouts,
    pub refresh_policy: RefreshPolicy,
}

impl ClientConfig {
    /// Config pointing at `base_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            timeouts: Timeouts::default(),
            refresh_policy: RefreshPolicy::default(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `REPORTDESK_BASE_URL`: default `http://127.0.0.1:8000`
    /// - `REPORTDESK_API_PREFIX`: default `/api`
    /// - `REPORTDESK_TOKEN_FILE`: default `.reportdesk/session.json`
    /// - `REPORTDESK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `REPORTDESK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `REPORTDESK_AUTH_TIMEOUT_SECS`: default 15
    /// - `REPORTDESK_REFRESH_POLICY`: `any-failure` (default) or `rejection`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or refresh policy is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or refresh policy is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("REPORTDESK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let api_prefix = normalize_api_prefix(
            &lookup("REPORTDESK_API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.to_owned()),
        );
        let token_file = lookup("REPORTDESK_TOKEN_FILE")
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_TOKEN_FILE), PathBuf::from);
        let timeouts = Timeouts {
            request: secs_or(&lookup, "REPORTDESK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect: secs_or(&lookup, "REPORTDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            auth: secs_or(&lookup, "REPORTDESK_AUTH_TIMEOUT_SECS", DEFAULT_AUTH_TIMEOUT_SECS),
        };
        let refresh_policy = parse_refresh_policy(lookup("REPORTDESK_REFRESH_POLICY").as_deref())?;

        Ok(Self { base_url: normalize_base_url(&base_url)?, api_prefix, token_file, timeouts, refresh_policy })
    }

    /// Replace the base URL, keeping every other setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` is not http(s).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    /// Absolute URL for an API path such as `/auth/me`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }
}

fn secs_or<F>(lookup: &F, key: &str, default: u64) -> Duration
where
    F: Fn(&str) -> Option<String>,
{
    let secs = lookup(key)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default);
    Duration::from_secs(secs)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn normalize_api_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") }
}

fn parse_refresh_policy(raw: Option<&str>) -> Result<RefreshPolicy, ConfigError> {
    match raw.map(str::trim).unwrap_or("any-failure") {
        "any-failure" => Ok(RefreshPolicy::LogoutOnAnyFailure),
        "rejection" => Ok(RefreshPolicy::LogoutOnRejection),
        other => Err(ConfigError::ConfigParse(format!(
            "unknown REPORTDESK_REFRESH_POLICY '{other}' (expected 'any-failure' or 'rejection')"
        ))),
    }
}
