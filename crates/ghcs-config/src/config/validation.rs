use ghcs_utils::error::ConfigError;

use super::Config;

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn check_url(key: &str, url: &str) -> Result<(), ConfigError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(invalid(key, &format!("{url} (must be an http or https URL)")))
    }
}

impl Config {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("rest_url", &self.api.rest_url)?;
        check_url("graphql_url", &self.api.graphql_url)?;
        check_url("regions_url", &self.api.regions_url)?;

        if self.api.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be greater than 0"));
        }
        if self.codespaces.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be greater than 0"));
        }
        if self.codespaces.max_ready_attempts == 0 {
            return Err(invalid("max_ready_attempts", "must be greater than 0"));
        }
        if self.codespaces.status_interval_ms == 0 {
            return Err(invalid("status_interval_ms", "must be greater than 0"));
        }
        // Completion needs two quiet ticks.
        if self.codespaces.max_status_ticks < 2 {
            return Err(invalid("max_status_ticks", "must be at least 2"));
        }

        Ok(())
    }
}
