//! Loader configuration.
//!
//! Defaults suit local use: schemas resolve relative to the current
//! directory and remote loading is on. Override via environment variables
//! or explicit construction.

use std::path::PathBuf;

use crate::retry::RetryPolicy;

/// Largest accepted `SCHEMAPROC_MAX_RETRIES`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Configuration for [`UriLoader`](crate::UriLoader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Root directory for relative schema paths.
    pub schema_dir: PathBuf,
    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
    /// Whether `http://` and `https://` identifiers may be fetched.
    pub allow_remote: bool,
    /// Retries after the first failed HTTP attempt.
    pub max_retries: u32,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("."),
            http_timeout_secs: 30,
            allow_remote: true,
            max_retries: RetryPolicy::default().max_retries,
        }
    }
}

impl LoaderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SCHEMAPROC_SCHEMA_DIR` (default: `.`)
    /// - `SCHEMAPROC_HTTP_TIMEOUT_SECS` (default: 30)
    /// - `SCHEMAPROC_ALLOW_REMOTE` (default: true)
    /// - `SCHEMAPROC_MAX_RETRIES` (default: 3, at most [`MAX_RETRIES_LIMIT`])
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let max_retries = parse_var(&lookup, "SCHEMAPROC_MAX_RETRIES", defaults.max_retries)?;
        if max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::InvalidValue(
                "SCHEMAPROC_MAX_RETRIES".to_string(),
                max_retries.to_string(),
            ));
        }
        Ok(Self {
            schema_dir: lookup("SCHEMAPROC_SCHEMA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.schema_dir),
            http_timeout_secs: parse_var(
                &lookup,
                "SCHEMAPROC_HTTP_TIMEOUT_SECS",
                defaults.http_timeout_secs,
            )?,
            allow_remote: match lookup("SCHEMAPROC_ALLOW_REMOTE") {
                Some(raw) => parse_flag("SCHEMAPROC_ALLOW_REMOTE", &raw)?,
                None => defaults.allow_remote,
            },
            max_retries,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw.clone())),
        None => Ok(default),
    }
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(var.to_string(), raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}
