use std::collections::BTreeMap;

use super::Config;

/// Every key that carries source attribution.
pub(crate) const KEYS: &[&str] = &[
    "rest_url",
    "graphql_url",
    "regions_url",
    "timeout_secs",
    "poll_interval_ms",
    "max_ready_attempts",
    "status_interval_ms",
    "max_status_ticks",
    "verbose",
    "token",
];

impl Config {
    /// Effective configuration as `key -> (value, source)`, sorted by key.
    ///
    /// The token value is never included, only whether it is set.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: String| {
            config.insert(key.to_string(), (value, self.source_of(key).to_string()));
        };

        add("rest_url", self.api.rest_url.clone());
        add("graphql_url", self.api.graphql_url.clone());
        add("regions_url", self.api.regions_url.clone());
        add("timeout_secs", self.api.timeout_secs.to_string());
        add("poll_interval_ms", self.codespaces.poll_interval_ms.to_string());
        add(
            "max_ready_attempts",
            self.codespaces.max_ready_attempts.to_string(),
        );
        add(
            "status_interval_ms",
            self.codespaces.status_interval_ms.to_string(),
        );
        add("max_status_ticks", self.codespaces.max_status_ticks.to_string());
        add("verbose", self.defaults.verbose.to_string());
        add(
            "token",
            if self.token.is_some() { "set" } else { "unset" }.to_string(),
        );

        config
    }
}
