//! Creating and forking repositories.

use chrono::{DateTime, Utc};
use ghcs_utils::error::ApiError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::http_client::decode_json;
use crate::repo::RepoRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

/// What `repo create` asks for. `owner` is an organization login; `None`
/// creates the repository under the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRepository {
    pub name: String,
    pub owner: Option<String>,
    /// Team slug within `owner` to grant access.
    pub team: Option<String>,
    pub description: String,
    pub homepage: String,
    pub visibility: Visibility,
    pub has_issues: bool,
    pub has_wiki: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRepository {
    pub name_with_owner: String,
    pub url: String,
}

/// The fork returned by the API; an existing fork comes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForkedRepository {
    pub full_name: String,
    pub clone_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRepositoryInput<'a> {
    name: &'a str,
    visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage_url: Option<&'a str>,
    has_issues_enabled: bool,
    has_wiki_enabled: bool,
}

#[derive(Deserialize)]
struct NodeId {
    node_id: String,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

const CREATE_MUTATION: &str = "mutation RepositoryCreate($input: CreateRepositoryInput!) {
  createRepository(input: $input) {
    repository { nameWithOwner url }
  }
}";

impl ApiClient {
    /// Organization and team names are resolved to node IDs first.
    pub async fn create_repository(
        &self,
        repo: &NewRepository,
    ) -> Result<CreatedRepository, ApiError> {
        #[derive(Deserialize)]
        struct Payload {
            repository: CreatedRepository,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Data {
            create_repository: Payload,
        }

        let owner_id = match &repo.owner {
            Some(org) => {
                let node: NodeId = self
                    .get_json(&format!("orgs/{org}"), "looking up organization")
                    .await?;
                Some(node.node_id)
            }
            None => None,
        };
        let team_id = match (&repo.owner, &repo.team) {
            (Some(org), Some(team)) => {
                let node: NodeId = self
                    .get_json(&format!("orgs/{org}/teams/{team}"), "looking up team")
                    .await?;
                Some(node.node_id)
            }
            _ => None,
        };

        let input = CreateRepositoryInput {
            name: &repo.name,
            visibility: repo.visibility,
            owner_id,
            team_id,
            description: non_empty(&repo.description),
            homepage_url: non_empty(&repo.homepage),
            has_issues_enabled: repo.has_issues,
            has_wiki_enabled: repo.has_wiki,
        };
        debug!(name = %repo.name, owner = ?repo.owner, "creating repository");
        let data: Data = self
            .graphql(CREATE_MUTATION, json!({ "input": input }))
            .await?;
        Ok(data.create_repository.repository)
    }

    pub async fn fork_repository(&self, repo: &RepoRef) -> Result<ForkedRepository, ApiError> {
        let url = self.resolve_url(&format!("repos/{}/{}/forks", repo.owner, repo.name));
        let request = self.authed(Method::POST, &url).json(&json!({}));
        let response = self.http().send_checked(request, "forking repository").await?;
        decode_json(response, "forking repository").await
    }
}
