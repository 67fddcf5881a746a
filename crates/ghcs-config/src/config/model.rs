use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_REST_URL: &str = "https://api.github.com";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_REGIONS_URL: &str = "https://online.visualstudio.com/api/v1/locations";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_READY_ATTEMPTS: u32 = 30;
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 1000;
/// Ten minutes of setup narration at the default interval.
pub const DEFAULT_MAX_STATUS_TICKS: u32 = 600;

/// Remote endpoints and the per-request timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub rest_url: String,
    pub graphql_url: String,
    pub regions_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_url: DEFAULT_REST_URL.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            regions_url: DEFAULT_REGIONS_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Polling budgets for readiness and post-create narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodespacesConfig {
    pub poll_interval_ms: u64,
    pub max_ready_attempts: u32,
    pub status_interval_ms: u64,
    pub max_status_ticks: u32,
}

impl Default for CodespacesConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_ready_attempts: DEFAULT_MAX_READY_ATTEMPTS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            max_status_ticks: DEFAULT_MAX_STATUS_TICKS,
        }
    }
}

impl CodespacesConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    pub verbose: bool,
}

/// API token read from the environment.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(****)")
    }
}

/// Flags from the command line that participate in configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<std::path::PathBuf>,
    /// `Some(true)` only when `--verbose` was passed.
    pub verbose: Option<bool>,
}

/// On-disk shape of `config.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub api: Option<TomlApi>,
    pub codespaces: Option<TomlCodespaces>,
    pub defaults: Option<TomlDefaults>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlApi {
    pub rest_url: Option<String>,
    pub graphql_url: Option<String>,
    pub regions_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlCodespaces {
    pub poll_interval_ms: Option<u64>,
    pub max_ready_attempts: Option<u32>,
    pub status_interval_ms: Option<u64>,
    pub max_status_ticks: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlDefaults {
    pub verbose: Option<bool>,
}
