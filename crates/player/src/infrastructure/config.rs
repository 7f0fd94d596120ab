//! Client configuration
//!
//! Read from `PHANTOM_*` environment variables, each with a default. The
//! binary loads `.env.local` / `.env` from the repository root first, so
//! local overrides work without exporting anything.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `PHANTOM_ENGINE_URL` | `http://localhost:8000` |
//! | `PHANTOM_REQUEST_TIMEOUT_MS` | `30000` |
//! | `PHANTOM_PLAYER_NAME` | `Investigator` |
//! | `PHANTOM_SYSTEM_NAME` | `System` |
//! | `PHANTOM_PLAYER_ALIASES` | `유저,User` |
//! | `PHANTOM_SUSPICION_MAX` | `10` |
//! | `PHANTOM_SUSPICION_HIGH` | `5` |

use std::time::Duration;

use phantomlog_domain::{DomainError, SuspicionScale};
use url::Url;

use crate::application::ClientOptions;

/// Default engine base URL.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8000";

/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default identity of the local player.
pub const DEFAULT_PLAYER_NAME: &str = "Investigator";

/// Default sender name the engine uses for narration.
pub const DEFAULT_SYSTEM_NAME: &str = "System";

/// Sender names the engine writes the player's own lines under.
pub const DEFAULT_PLAYER_ALIASES: &str = "유저,User";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is not a valid URL ({value}): {reason}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key} must be a non-negative integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },

    #[error("Invalid suspicion scale: {0}")]
    InvalidScale(#[from] DomainError),

    #[error("HTTP client could not be built: {0}")]
    HttpClient(String),
}

/// Settings for the player client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub engine_url: Url,
    pub request_timeout: Duration,
    pub player_name: String,
    pub system_name: String,
    pub player_aliases: Vec<String>,
    pub suspicion_scale: SuspicionScale,
}

impl ClientConfig {
    /// Create config from environment variables, falling back to defaults
    /// for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let engine_url = parse_url(
            "PHANTOM_ENGINE_URL",
            lookup("PHANTOM_ENGINE_URL").as_deref(),
        )?;
        let timeout_ms = parse_number(
            "PHANTOM_REQUEST_TIMEOUT_MS",
            lookup("PHANTOM_REQUEST_TIMEOUT_MS").as_deref(),
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?;
        let player_name = parse_name(
            "PHANTOM_PLAYER_NAME",
            lookup("PHANTOM_PLAYER_NAME").as_deref(),
            DEFAULT_PLAYER_NAME,
        )?;
        let system_name = parse_name(
            "PHANTOM_SYSTEM_NAME",
            lookup("PHANTOM_SYSTEM_NAME").as_deref(),
            DEFAULT_SYSTEM_NAME,
        )?;

        let player_aliases = parse_list(
            lookup("PHANTOM_PLAYER_ALIASES").as_deref(),
            DEFAULT_PLAYER_ALIASES,
        );

        let defaults = SuspicionScale::default();
        let max = parse_number(
            "PHANTOM_SUSPICION_MAX",
            lookup("PHANTOM_SUSPICION_MAX").as_deref(),
            u64::from(defaults.max()),
        )?;
        let high = parse_number(
            "PHANTOM_SUSPICION_HIGH",
            lookup("PHANTOM_SUSPICION_HIGH").as_deref(),
            u64::from(defaults.high_threshold()),
        )?;
        let suspicion_scale = SuspicionScale::new(
            u32::try_from(max).unwrap_or(u32::MAX),
            u32::try_from(high).unwrap_or(u32::MAX),
        )?;

        Ok(Self {
            engine_url,
            request_timeout: Duration::from_millis(timeout_ms),
            player_name,
            system_name,
            player_aliases,
            suspicion_scale,
        })
    }

    /// Application-level options derived from this config.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            system_name: self.system_name.clone(),
            player_aliases: self.player_aliases.clone(),
            suspicion_scale: self.suspicion_scale,
            request_timeout: self.request_timeout,
        }
    }
}

fn parse_url(key: &'static str, value: Option<&str>) -> Result<Url, ConfigError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_ENGINE_URL);
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            key,
            value: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_number(key: &'static str, value: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_name(
    key: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<String, ConfigError> {
    match value {
        None => Ok(default.to_string()),
        Some(raw) if raw.trim().is_empty() => Err(ConfigError::Empty { key }),
        Some(raw) => Ok(raw.trim().to_string()),
    }
}

/// Comma-separated names. An empty value disables the list.
fn parse_list(value: Option<&str>, default: &str) -> Vec<String> {
    value
        .unwrap_or(default)
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
