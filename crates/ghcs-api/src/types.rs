//! Resources returned by the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Lifecycle state of a codespace's environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CodespaceState {
    Available,
    Shutdown,
    Starting,
    Provisioning,
    Queued,
    #[default]
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for CodespaceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Available => "Available",
            Self::Shutdown => "Shutdown",
            Self::Starting => "Starting",
            Self::Provisioning => "Provisioning",
            Self::Queued => "Queued",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodespaceConnection {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub session_token: String,
    #[serde(default)]
    pub relay_endpoint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodespaceEnvironment {
    #[serde(default)]
    pub state: CodespaceState,
    #[serde(default)]
    pub connection: CodespaceConnection,
}

/// A codespace and the session details needed to connect to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codespace {
    pub name: String,
    pub owner_login: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub repository_nwo: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub environment: CodespaceEnvironment,
}

impl Codespace {
    /// Available with a live session.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.environment.state == CodespaceState::Available
            && !self.environment.connection.session_id.is_empty()
    }
}

/// A machine type offered for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCreateStatus {
    Running,
    Succeeded,
    Failed,
}

impl PostCreateStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PostCreateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named step of the post-create setup at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCreateState {
    pub name: String,
    pub status: PostCreateStatus,
}

impl PostCreateState {
    pub fn new(name: impl Into<String>, status: PostCreateStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCodespaceParams {
    pub repository_id: u64,
    #[serde(rename = "ref")]
    pub branch: String,
    pub machine: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GpgKey {
    pub key_id: String,
    pub public_key: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Repository details shown by `repo view`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryDetails {
    pub name_with_owner: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub stargazer_count: u64,
    pub fork_count: u64,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub default_branch_ref: Option<BranchRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    pub name: String,
}
