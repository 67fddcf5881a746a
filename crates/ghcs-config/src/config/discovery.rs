use std::path::{Path, PathBuf};

use ghcs_utils::error::{ConfigError, GhcsError};
use ghcs_utils::types::ConfigSource;

use super::model::{TomlConfig, Token};
use super::{CliArgs, Config};

/// Directory holding a user-wide `config.toml`.
pub const CONFIG_DIR_ENV: &str = "GHCS_CONFIG_DIR";

/// Checked in order; the first non-empty one wins.
pub const TOKEN_ENV_VARS: &[&str] = &["GITHUB_TOKEN", "GH_TOKEN"];

const REST_URL_ENV: &str = "GHCS_REST_URL";
const GRAPHQL_URL_ENV: &str = "GHCS_GRAPHQL_URL";
const VERBOSE_ENV: &str = "GHCS_VERBOSE";

fn process_env(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ if key == CONFIG_DIR_ENV => {
            dirs::config_dir().map(|dir| dir.join("ghcs").to_string_lossy().into_owned())
        }
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Discover configuration from the working directory and the process environment.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, GhcsError> {
        let start_dir = std::env::current_dir()?;
        Self::discover_with(&start_dir, cli_args, process_env)
    }

    /// Path- and environment-driven variant of [`Config::discover`].
    ///
    /// `env` stands in for the process environment so tests never touch
    /// global state.
    pub fn discover_with<F>(start_dir: &Path, cli_args: &CliArgs, env: F) -> Result<Self, GhcsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    }
                    .into());
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir).or_else(|| {
                env(CONFIG_DIR_ENV)
                    .map(|dir| PathBuf::from(dir).join("config.toml"))
                    .filter(|path| path.is_file())
            }),
        };

        if let Some(path) = &config_path {
            let file = Self::load_config_file(path)?;
            config.apply_file(file);
            config.config_path = Some(path.clone());
            tracing::debug!(path = %path.display(), "loaded config file");
        }

        // Environment overrides the file
        if let Some(url) = env(REST_URL_ENV) {
            config.api.rest_url = url;
            config.set_source("rest_url", ConfigSource::Env);
        }
        if let Some(url) = env(GRAPHQL_URL_ENV) {
            config.api.graphql_url = url;
            config.set_source("graphql_url", ConfigSource::Env);
        }
        if let Some(raw) = env(VERBOSE_ENV) {
            let verbose = parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: VERBOSE_ENV.to_string(),
                value: raw.clone(),
            })?;
            config.defaults.verbose = verbose;
            config.set_source("verbose", ConfigSource::Env);
        }
        if let Some(token) = TOKEN_ENV_VARS
            .iter()
            .find_map(|name| env(name).filter(|v| !v.is_empty()))
        {
            config.token = Some(Token::new(token));
            config.set_source("token", ConfigSource::Env);
        }

        // CLI overrides everything
        if let Some(verbose) = cli_args.verbose {
            config.defaults.verbose = verbose;
            config.set_source("verbose", ConfigSource::Cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.ghcs/config.toml`, stopping at
    /// repository root markers (.git, .hg, .svn) or the filesystem root.
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current = Some(start_dir);

        while let Some(dir) = current {
            let config_path = dir.join(".ghcs").join("config.toml");
            if config_path.is_file() {
                return Some(config_path);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current = dir.parent();
        }

        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidFile(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display())))
    }

    fn apply_file(&mut self, file: TomlConfig) {
        let src = ConfigSource::Config;

        if let Some(api) = file.api {
            if let Some(v) = api.rest_url {
                self.api.rest_url = v;
                self.set_source("rest_url", src);
            }
            if let Some(v) = api.graphql_url {
                self.api.graphql_url = v;
                self.set_source("graphql_url", src);
            }
            if let Some(v) = api.regions_url {
                self.api.regions_url = v;
                self.set_source("regions_url", src);
            }
            if let Some(v) = api.timeout_secs {
                self.api.timeout_secs = v;
                self.set_source("timeout_secs", src);
            }
        }

        if let Some(cs) = file.codespaces {
            if let Some(v) = cs.poll_interval_ms {
                self.codespaces.poll_interval_ms = v;
                self.set_source("poll_interval_ms", src);
            }
            if let Some(v) = cs.max_ready_attempts {
                self.codespaces.max_ready_attempts = v;
                self.set_source("max_ready_attempts", src);
            }
            if let Some(v) = cs.status_interval_ms {
                self.codespaces.status_interval_ms = v;
                self.set_source("status_interval_ms", src);
            }
            if let Some(v) = cs.max_status_ticks {
                self.codespaces.max_status_ticks = v;
                self.set_source("max_status_ticks", src);
            }
        }

        if let Some(defaults) = file.defaults
            && let Some(v) = defaults.verbose
        {
            self.defaults.verbose = v;
            self.set_source("verbose", src);
        }
    }

    fn set_source(&mut self, key: &str, source: ConfigSource) {
        self.source_attribution.insert(key.to_string(), source);
    }
}
