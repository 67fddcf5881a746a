//! Issue lookup, repository metadata and the `updateIssue` mutation.

use ghcs_utils::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::client::ApiClient;
use crate::repo::RepoRef;

/// An issue with the fields `issue edit` can change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issue {
    /// GraphQL node ID.
    pub id: String,
    pub number: u64,
    pub title: String,
    pub body: String,
    pub url: String,
    pub assignees: Vec<String>,
    pub labels: Vec<String>,
    pub projects: Vec<String>,
    pub milestone: Option<String>,
}

#[derive(Deserialize)]
struct Nodes<T> {
    #[serde(default = "Vec::new")]
    nodes: Vec<T>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct Name {
    name: String,
}

#[derive(Deserialize)]
struct ProjectCard {
    project: Name,
}

#[derive(Deserialize)]
struct Title {
    title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    id: String,
    number: u64,
    title: String,
    #[serde(default)]
    body: String,
    url: String,
    assignees: Nodes<Login>,
    labels: Nodes<Name>,
    project_cards: Nodes<ProjectCard>,
    milestone: Option<Title>,
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        Self {
            id: node.id,
            number: node.number,
            title: node.title,
            body: node.body,
            url: node.url,
            assignees: node.assignees.nodes.into_iter().map(|u| u.login).collect(),
            labels: node.labels.nodes.into_iter().map(|l| l.name).collect(),
            projects: node
                .project_cards
                .nodes
                .into_iter()
                .map(|c| c.project.name)
                .collect(),
            milestone: node.milestone.map(|m| m.title),
        }
    }
}

/// Which metadata lists to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataWanted {
    pub assignees: bool,
    pub labels: bool,
    pub projects: bool,
    pub milestones: bool,
}

impl MetadataWanted {
    #[must_use]
    pub fn any(&self) -> bool {
        self.assignees || self.labels || self.projects || self.milestones
    }
}

/// A name and the node ID it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedId {
    pub id: String,
    pub name: String,
}

/// Assignable users, labels, projects and open milestones of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    pub assignable_users: Vec<NamedId>,
    pub labels: Vec<NamedId>,
    pub projects: Vec<NamedId>,
    pub milestones: Vec<NamedId>,
}

/// Names are matched case-insensitively.
fn resolve(kind: &str, known: &[NamedId], names: &[String]) -> Result<Vec<String>, ApiError> {
    names
        .iter()
        .map(|name| {
            known
                .iter()
                .find(|k| k.name.eq_ignore_ascii_case(name))
                .map(|k| k.id.clone())
                .ok_or_else(|| ApiError::NotFound(format!("{kind} '{name}'")))
        })
        .collect()
}

impl RepoMetadata {
    pub fn members_to_ids(&self, logins: &[String]) -> Result<Vec<String>, ApiError> {
        resolve("user", &self.assignable_users, logins)
    }

    pub fn labels_to_ids(&self, names: &[String]) -> Result<Vec<String>, ApiError> {
        resolve("label", &self.labels, names)
    }

    pub fn projects_to_ids(&self, names: &[String]) -> Result<Vec<String>, ApiError> {
        resolve("project", &self.projects, names)
    }

    pub fn milestone_to_id(&self, title: &str) -> Result<String, ApiError> {
        let mut ids = resolve("milestone", &self.milestones, &[title.to_string()])?;
        Ok(ids.remove(0))
    }
}

/// Input of the `updateIssue` mutation. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_ids: Option<Vec<String>>,
    /// `Some(None)` clears the milestone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<Option<String>>,
}

const ISSUE_QUERY: &str = "query IssueByNumber($owner: String!, $repo: String!, $number: Int!) {
  repository(owner: $owner, name: $repo) {
    hasIssuesEnabled
    issue(number: $number) {
      id
      number
      title
      body
      url
      assignees(first: 100) { nodes { login } }
      labels(first: 100) { nodes { name } }
      projectCards(first: 100) { nodes { project { name } } }
      milestone { title }
    }
  }
}";

const METADATA_QUERY: &str = "query RepositoryMetadata(
  $owner: String!, $repo: String!,
  $assignees: Boolean!, $labels: Boolean!, $projects: Boolean!, $milestones: Boolean!
) {
  repository(owner: $owner, name: $repo) {
    assignableUsers(first: 100) @include(if: $assignees) { nodes { id login } }
    labels(first: 100) @include(if: $labels) { nodes { id name } }
    projects(first: 100, states: [OPEN]) @include(if: $projects) { nodes { id name } }
    milestones(first: 100, states: [OPEN]) @include(if: $milestones) { nodes { id title } }
  }
}";

const UPDATE_MUTATION: &str = "mutation IssueUpdate($input: UpdateIssueInput!) {
  updateIssue(input: $input) { __typename }
}";

impl ApiClient {
    pub async fn issue(&self, repo: &RepoRef, number: u64) -> Result<Issue, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RepositoryNode {
            has_issues_enabled: bool,
            issue: Option<IssueNode>,
        }
        #[derive(Deserialize)]
        struct Data {
            repository: Option<RepositoryNode>,
        }

        let data: Data = self
            .graphql(
                ISSUE_QUERY,
                json!({ "owner": repo.owner, "repo": repo.name, "number": number }),
            )
            .await?;
        let repository = data
            .repository
            .ok_or_else(|| ApiError::NotFound(format!("repository {repo}")))?;
        if !repository.has_issues_enabled {
            return Err(ApiError::NotFound(format!(
                "the '{repo}' repository has disabled issues"
            )));
        }
        repository
            .issue
            .map(Issue::from)
            .ok_or_else(|| ApiError::NotFound(format!("issue #{number} in {repo}")))
    }

    /// Fetch only the lists named in `wanted`; the rest stay empty.
    pub async fn repo_metadata(
        &self,
        repo: &RepoRef,
        wanted: MetadataWanted,
    ) -> Result<RepoMetadata, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RepositoryNode {
            assignable_users: Option<Nodes<IdLogin>>,
            labels: Option<Nodes<IdName>>,
            projects: Option<Nodes<IdName>>,
            milestones: Option<Nodes<IdTitle>>,
        }
        #[derive(Deserialize)]
        struct IdLogin {
            id: String,
            login: String,
        }
        #[derive(Deserialize)]
        struct IdName {
            id: String,
            name: String,
        }
        #[derive(Deserialize)]
        struct IdTitle {
            id: String,
            title: String,
        }
        #[derive(Deserialize)]
        struct Data {
            repository: Option<RepositoryNode>,
        }

        if !wanted.any() {
            return Ok(RepoMetadata::default());
        }

        let data: Data = self
            .graphql(
                METADATA_QUERY,
                json!({
                    "owner": repo.owner,
                    "repo": repo.name,
                    "assignees": wanted.assignees,
                    "labels": wanted.labels,
                    "projects": wanted.projects,
                    "milestones": wanted.milestones,
                }),
            )
            .await?;
        let repository = data
            .repository
            .ok_or_else(|| ApiError::NotFound(format!("repository {repo}")))?;

        let named = |id: String, name: String| NamedId { id, name };
        Ok(RepoMetadata {
            assignable_users: repository
                .assignable_users
                .map(|n| n.nodes.into_iter().map(|u| named(u.id, u.login)).collect())
                .unwrap_or_default(),
            labels: repository
                .labels
                .map(|n| n.nodes.into_iter().map(|l| named(l.id, l.name)).collect())
                .unwrap_or_default(),
            projects: repository
                .projects
                .map(|n| n.nodes.into_iter().map(|p| named(p.id, p.name)).collect())
                .unwrap_or_default(),
            milestones: repository
                .milestones
                .map(|n| n.nodes.into_iter().map(|m| named(m.id, m.title)).collect())
                .unwrap_or_default(),
        })
    }

    pub async fn update_issue(&self, update: &IssueUpdate) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .graphql(UPDATE_MUTATION, json!({ "input": update }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{CannedResponse, serve_once};
    use ghcs_config::{ApiConfig, Token};

    fn client_for(base: &str) -> ApiClient {
        let config = ApiConfig {
            rest_url: base.to_string(),
            graphql_url: format!("{base}/graphql"),
            regions_url: format!("{base}/locations"),
            timeout_secs: 5,
        };
        ApiClient::new(&config, &Token::new("test-token")).unwrap()
    }

    fn request_body(raw: &str) -> serde_json::Value {
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    fn metadata() -> RepoMetadata {
        let named = |id: &str, name: &str| NamedId {
            id: id.to_string(),
            name: name.to_string(),
        };
        RepoMetadata {
            assignable_users: vec![named("U1", "monalisa"), named("U2", "hubot")],
            labels: vec![named("L1", "bug"), named("L2", "help wanted")],
            projects: vec![named("P1", "Roadmap")],
            milestones: vec![named("M1", "v1.0")],
        }
    }

    #[test]
    fn test_names_resolve_case_insensitively() {
        let meta = metadata();
        assert_eq!(
            meta.labels_to_ids(&["Help Wanted".to_string(), "bug".to_string()])
                .unwrap(),
            vec!["L2", "L1"]
        );
        assert_eq!(meta.members_to_ids(&["HUBOT".to_string()]).unwrap(), vec!["U2"]);
        assert_eq!(meta.milestone_to_id("v1.0").unwrap(), "M1");
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let err = metadata()
            .projects_to_ids(&["Roadmap".to_string(), "Backlog".to_string()])
            .unwrap_err();
        assert_eq!(err, ApiError::NotFound("project 'Backlog'".to_string()));
    }

    #[test]
    fn test_update_input_skips_unchanged_fields() {
        let update = IssueUpdate {
            id: "I1".to_string(),
            title: Some("New title".to_string()),
            label_ids: Some(Vec::new()),
            milestone_id: Some(None),
            ..IssueUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({ "id": "I1", "title": "New title", "labelIds": [], "milestoneId": null })
        );
    }

    #[tokio::test]
    async fn test_issue_lookup() {
        let (base, request) = serve_once(CannedResponse::json(
            200,
            r#"{"data":{"repository":{"hasIssuesEnabled":true,"issue":{
                "id":"I_1","number":23,"title":"Bug","body":"Nothing works",
                "url":"https://github.com/octo/widgets/issues/23",
                "assignees":{"nodes":[{"login":"monalisa"}]},
                "labels":{"nodes":[{"name":"bug"}]},
                "projectCards":{"nodes":[{"project":{"name":"Roadmap"}}]},
                "milestone":null}}}}"#,
        ))
        .await;
        let client = client_for(&base);
        let repo = RepoRef::parse("octo/widgets").unwrap();

        let issue = client.issue(&repo, 23).await.unwrap();
        assert_eq!(issue.id, "I_1");
        assert_eq!(issue.assignees, vec!["monalisa"]);
        assert_eq!(issue.projects, vec!["Roadmap"]);
        assert_eq!(issue.milestone, None);

        let raw = request.await.unwrap();
        assert!(raw.starts_with("POST /graphql "));
        let body = request_body(&raw);
        assert_eq!(body["variables"], json!({ "owner": "octo", "repo": "widgets", "number": 23 }));
    }

    #[tokio::test]
    async fn test_issues_disabled() {
        let (base, _request) = serve_once(CannedResponse::json(
            200,
            r#"{"data":{"repository":{"hasIssuesEnabled":false,"issue":null}}}"#,
        ))
        .await;
        let client = client_for(&base);
        let repo = RepoRef::parse("octo/widgets").unwrap();

        let err = client.issue(&repo, 1).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m.contains("disabled issues")));
    }

    #[tokio::test]
    async fn test_metadata_fetches_requested_lists() {
        let (base, request) = serve_once(CannedResponse::json(
            200,
            r#"{"data":{"repository":{
                "labels":{"nodes":[{"id":"L1","name":"bug"}]},
                "milestones":{"nodes":[{"id":"M1","title":"v1.0"}]}}}}"#,
        ))
        .await;
        let client = client_for(&base);
        let repo = RepoRef::parse("octo/widgets").unwrap();
        let wanted = MetadataWanted {
            labels: true,
            milestones: true,
            ..MetadataWanted::default()
        };

        let meta = client.repo_metadata(&repo, wanted).await.unwrap();
        assert_eq!(meta.labels_to_ids(&["bug".to_string()]).unwrap(), vec!["L1"]);
        assert_eq!(meta.milestone_to_id("v1.0").unwrap(), "M1");
        assert!(meta.assignable_users.is_empty());

        let body = request_body(&request.await.unwrap());
        assert_eq!(body["variables"]["assignees"], json!(false));
        assert_eq!(body["variables"]["labels"], json!(true));
    }

    #[tokio::test]
    async fn test_nothing_wanted_skips_request() {
        let client = client_for("http://127.0.0.1:9");
        let repo = RepoRef::parse("octo/widgets").unwrap();
        let meta = client
            .repo_metadata(&repo, MetadataWanted::default())
            .await
            .unwrap();
        assert_eq!(meta, RepoMetadata::default());
    }

    #[tokio::test]
    async fn test_update_sends_input() {
        let (base, request) = serve_once(CannedResponse::json(
            200,
            r#"{"data":{"updateIssue":{"__typename":"UpdateIssuePayload"}}}"#,
        ))
        .await;
        let client = client_for(&base);

        client
            .update_issue(&IssueUpdate {
                id: "I_1".to_string(),
                body: Some("Fixed".to_string()),
                ..IssueUpdate::default()
            })
            .await
            .unwrap();

        let body = request_body(&request.await.unwrap());
        assert_eq!(body["variables"]["input"], json!({ "id": "I_1", "body": "Fixed" }));
    }
}
