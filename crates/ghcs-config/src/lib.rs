//! Configuration for ghcs.
//!
//! Values resolve with precedence CLI > environment > `.ghcs/config.toml` >
//! built-in defaults, and every key remembers where its value came from.

mod config;

pub use config::{
    ApiConfig, CONFIG_DIR_ENV, CliArgs, CodespacesConfig, Config, Defaults, TOKEN_ENV_VARS, Token,
};
pub use ghcs_utils::types::ConfigSource;
