use anyhow::{Result, anyhow};
use std::env;
use std::fmt;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS_VAR: &str = "REQUEST_TIMEOUT_SECS";

/// Per-invocation settings collected from command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the bearer credential.
    pub api_key_env: String,
}

/// Resolved bearer credential. Never rendered by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(********)")
    }
}

pub fn resolve_api_key(name: &str) -> Result<ApiKey> {
    resolve_api_key_with(name, |key| env::var(key).ok())
}

pub fn resolve_api_key_with(
    name: &str,
    mut get_var: impl FnMut(&str) -> Option<String>,
) -> Result<ApiKey> {
    get_var(name)
        .filter(|value| !value.is_empty())
        .map(ApiKey)
        .ok_or_else(|| anyhow!("{} environment variable not set", name))
}

/// Process-wide settings that are not part of the invocation flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub request_timeout_secs: Option<u64>,
}

impl RuntimeSettings {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            request_timeout_secs: parse_positive_u64(get_var(REQUEST_TIMEOUT_SECS_VAR).as_deref()),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_positive_u64(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}
