use std::fmt;

use ghcs_utils::error::ConfigError;

/// An `OWNER/REPO` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Accepts `OWNER/REPO`, `https://HOST/OWNER/REPO[.git]` and
    /// `git@HOST:OWNER/REPO[.git]`.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepository(input.to_string());
        let trimmed = input.trim();

        let path = if let Some(rest) = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
        {
            rest.split_once('/').map(|(_, path)| path).ok_or_else(invalid)?
        } else if let Some(rest) = trimmed.strip_prefix("git@") {
            rest.split_once(':').map(|(_, path)| path).ok_or_else(invalid)?
        } else {
            trimmed
        };

        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if valid_segment(owner) && valid_segment(name) => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(invalid()),
        }
    }
}

fn valid_segment(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
