//! Configuration discovery against the real process environment
//!
//! These tests change the working directory and environment variables, so
//! they run serially.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use ghcs::{CliArgs, Config};
use ghcs_config::{CONFIG_DIR_ENV, ConfigSource, TOKEN_ENV_VARS};
use serial_test::serial;
use tempfile::TempDir;

/// Restores the working directory and the touched variables on drop.
struct EnvGuard {
    original_dir: PathBuf,
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn new(vars: &[&'static str]) -> Self {
        let saved = vars.iter().map(|v| (*v, env::var(v).ok())).collect();
        for var in vars {
            unsafe {
                env::remove_var(var);
            }
        }
        Self {
            original_dir: env::current_dir().unwrap(),
            saved,
        }
    }

    fn set(&self, key: &str, value: impl AsRef<std::ffi::OsStr>) {
        unsafe {
            env::set_var(key, value);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.original_dir);
        for (key, value) in &self.saved {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

fn guard() -> EnvGuard {
    let mut vars = vec![CONFIG_DIR_ENV, "GHCS_REST_URL", "GHCS_GRAPHQL_URL", "GHCS_VERBOSE"];
    vars.extend_from_slice(TOKEN_ENV_VARS);
    EnvGuard::new(&vars)
}

fn repo_root() -> Result<TempDir> {
    let dir = TempDir::new()?;
    fs::create_dir_all(dir.path().join(".git"))?;
    Ok(dir)
}

fn write_config(dir: &Path, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir.join(".ghcs"))?;
    let path = dir.join(".ghcs").join("config.toml");
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
#[serial]
fn test_discovers_config_from_subdirectory() -> Result<()> {
    let vars = guard();
    let root = repo_root()?;
    vars.set(CONFIG_DIR_ENV, root.path().join("nowhere"));
    write_config(root.path(), "[codespaces]\nmax_status_ticks = 120\n")?;

    let nested = root.path().join("src").join("deep");
    fs::create_dir_all(&nested)?;
    env::set_current_dir(&nested)?;

    let config = Config::discover(&CliArgs::default())?;
    assert_eq!(config.codespaces.max_status_ticks, 120);
    assert_eq!(config.source_of("max_status_ticks"), ConfigSource::Config);
    Ok(())
}

#[test]
#[serial]
fn test_token_precedence_between_env_vars() -> Result<()> {
    let vars = guard();
    let root = repo_root()?;
    vars.set(CONFIG_DIR_ENV, root.path().join("nowhere"));
    env::set_current_dir(root.path())?;

    vars.set("GH_TOKEN", "gh-token-value");
    let config = Config::discover(&CliArgs::default())?;
    assert_eq!(config.require_token()?.expose(), "gh-token-value");

    vars.set("GITHUB_TOKEN", "github-token-value");
    let config = Config::discover(&CliArgs::default())?;
    assert_eq!(config.require_token()?.expose(), "github-token-value");
    assert_eq!(config.source_of("token"), ConfigSource::Env);
    Ok(())
}

#[test]
#[serial]
fn test_user_config_dir_fallback() -> Result<()> {
    let vars = guard();
    let root = repo_root()?;
    let user_dir = root.path().join("user");
    fs::create_dir_all(&user_dir)?;
    fs::write(user_dir.join("config.toml"), "[api]\ntimeout_secs = 9\n")?;
    vars.set(CONFIG_DIR_ENV, &user_dir);
    env::set_current_dir(root.path())?;

    let config = Config::discover(&CliArgs::default())?;
    assert_eq!(config.api.timeout_secs, 9);
    assert_eq!(config.config_path.as_deref(), Some(user_dir.join("config.toml").as_path()));
    Ok(())
}

#[test]
#[serial]
fn test_cli_verbose_beats_env() -> Result<()> {
    let vars = guard();
    let root = repo_root()?;
    vars.set(CONFIG_DIR_ENV, root.path().join("nowhere"));
    vars.set("GHCS_VERBOSE", "false");
    env::set_current_dir(root.path())?;

    let config = Config::discover(&CliArgs {
        verbose: Some(true),
        ..CliArgs::default()
    })?;
    assert!(config.defaults.verbose);
    assert_eq!(config.source_of("verbose"), ConfigSource::Cli);
    Ok(())
}

#[test]
#[serial]
fn test_invalid_env_value_is_rejected() -> Result<()> {
    let vars = guard();
    let root = repo_root()?;
    vars.set(CONFIG_DIR_ENV, root.path().join("nowhere"));
    vars.set("GHCS_VERBOSE", "sometimes");
    env::set_current_dir(root.path())?;

    let err = Config::discover(&CliArgs::default()).unwrap_err();
    assert_eq!(err.to_exit_code(), ghcs::ExitCode::CLI_ARGS);
    Ok(())
}
