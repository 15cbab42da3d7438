use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Result, ScribeError};

pub const API_URL_ENV: &str = "SCRIBE_API_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "SCRIBE_REQUEST_TIMEOUT";
pub const CHECK_TIMEOUT_ENV: &str = "SCRIBE_CHECK_TIMEOUT";

/// Connection settings for the settings backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_check_timeout")]
    pub check_timeout_secs: u64,
}

fn default_api_base() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_check_timeout() -> u64 {
    5
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
            check_timeout_secs: default_check_timeout(),
        }
    }
}

impl ClientConfig {
    /// Build from `SCRIBE_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_base = lookup(API_URL_ENV)
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.api_base);

        let request_timeout_secs = match lookup(REQUEST_TIMEOUT_ENV) {
            Some(raw) => parse_secs(REQUEST_TIMEOUT_ENV, &raw)?,
            None => defaults.request_timeout_secs,
        };

        let check_timeout_secs = match lookup(CHECK_TIMEOUT_ENV) {
            Some(raw) => parse_secs(CHECK_TIMEOUT_ENV, &raw)?,
            None => defaults.check_timeout_secs,
        };

        Ok(Self {
            api_base,
            request_timeout_secs,
            check_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| ScribeError::Config(format!("Invalid {}: {}", key, e)))
}
