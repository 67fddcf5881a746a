//! Config command implementation

use anyhow::Result;

use crate::Config;

/// Execute `config`: every effective value with the layer it came from.
pub fn execute_config_command(config: &Config) -> Result<()> {
    print!("{}", format_effective_config(config));
    Ok(())
}

#[must_use]
pub fn format_effective_config(config: &Config) -> String {
    let mut out = match &config.config_path {
        Some(path) => format!("Config file: {}\n", path.display()),
        None => "Config file: none (using defaults)\n".to_string(),
    };

    out.push_str("\nEffective configuration:\n");
    for (key, (value, source)) in config.effective_config() {
        out.push_str(&format!("  {key} = {value} (from {source})\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghcs_config::Token;

    #[test]
    fn test_defaults_without_file() {
        let out = format_effective_config(&Config::default());
        assert!(out.starts_with("Config file: none"));
        assert!(out.contains("  max_ready_attempts = 30 (from default)\n"));
        assert!(out.contains("  token = unset"));
    }

    #[test]
    fn test_token_value_never_printed() {
        let config = Config {
            token: Some(Token::new("ghp_secretsecretsecret")),
            ..Config::default()
        };
        let out = format_effective_config(&config);
        assert!(out.contains("  token = set"));
        assert!(!out.contains("ghp_secretsecretsecret"));
    }
}
