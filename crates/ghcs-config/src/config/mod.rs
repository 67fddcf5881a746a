mod discovery;
mod model;
mod sources;
mod validation;

use std::collections::HashMap;
use std::path::PathBuf;

use ghcs_utils::error::ConfigError;
use ghcs_utils::types::ConfigSource;

pub use discovery::{CONFIG_DIR_ENV, TOKEN_ENV_VARS};
pub use model::{ApiConfig, CliArgs, CodespacesConfig, Defaults, Token};

/// Configuration for a ghcs invocation.
///
/// Built by [`Config::discover`] (or [`Config::discover_with`] in tests) with
/// precedence CLI > environment > config file > built-in defaults.
///
/// # Discovery
///
/// - `--config <path>` names the file explicitly; it must exist
/// - otherwise `.ghcs/config.toml` is searched upward from the working
///   directory, stopping at a repository root (`.git`, `.hg`, `.svn`)
/// - otherwise `$GHCS_CONFIG_DIR/config.toml` (or the platform config dir)
///
/// The API token is only ever read from `GITHUB_TOKEN` or `GH_TOKEN`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub codespaces: CodespacesConfig,
    pub defaults: Defaults,
    pub token: Option<Token>,
    /// File the values were loaded from, if any.
    pub config_path: Option<PathBuf>,
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        let mut source_attribution = HashMap::new();
        for key in sources::KEYS {
            source_attribution.insert((*key).to_string(), ConfigSource::Default);
        }
        Self {
            api: ApiConfig::default(),
            codespaces: CodespacesConfig::default(),
            defaults: Defaults::default(),
            token: None,
            config_path: None,
            source_attribution,
        }
    }
}

impl Config {
    /// The token, or [`ConfigError::MissingToken`] when neither variable is set.
    pub fn require_token(&self) -> Result<&Token, ConfigError> {
        self.token.as_ref().ok_or(ConfigError::MissingToken)
    }

    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }
}
