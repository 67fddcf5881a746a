//! Typed client for the codespaces, account and actions endpoints.

use async_trait::async_trait;
use ghcs_config::{ApiConfig, Token};
use ghcs_utils::error::ApiError;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::http_client::{HttpClient, decode_json};
use crate::repo::RepoRef;
use crate::rest::with_query;
use crate::types::{
    Codespace, CreateCodespaceParams, GpgKey, PostCreateState, Repository, RepositoryDetails, Sku,
    User,
};

const ACCEPT: &str = "application/vnd.github.v3+json";

/// The remote calls the codespace workflows depend on.
///
/// Each method issues a single request and never retries.
#[async_trait]
pub trait CodespacesApi: Send + Sync {
    async fn get_user(&self) -> Result<User, ApiError>;

    /// Nearest datacenter region for new codespaces.
    async fn get_region_location(&self) -> Result<String, ApiError>;

    async fn get_repository(&self, nwo: &str) -> Result<Repository, ApiError>;

    async fn get_skus(
        &self,
        user: &User,
        repository: &Repository,
        branch: &str,
        location: &str,
    ) -> Result<Vec<Sku>, ApiError>;

    async fn create_codespace(
        &self,
        user: &User,
        params: &CreateCodespaceParams,
    ) -> Result<Codespace, ApiError>;

    /// Short-lived token scoped to one codespace.
    async fn get_codespace_token(&self, owner_login: &str, name: &str) -> Result<String, ApiError>;

    async fn get_codespace(
        &self,
        token: &str,
        owner_login: &str,
        name: &str,
    ) -> Result<Codespace, ApiError>;

    async fn start_codespace(&self, token: &str, codespace: &Codespace) -> Result<(), ApiError>;

    async fn list_codespaces(&self, user: &User) -> Result<Vec<Codespace>, ApiError>;

    async fn delete_codespace(&self, user: &User, name: &str) -> Result<(), ApiError>;

    /// Current snapshot of the post-create setup steps, in execution order.
    async fn get_post_create_states(
        &self,
        token: &str,
        codespace: &Codespace,
    ) -> Result<Vec<PostCreateState>, ApiError>;
}

/// Authenticated REST and GraphQL client.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    token: Token,
    rest_url: String,
    graphql_url: String,
    regions_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("rest_url", &self.rest_url)
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct RegionResponse {
    current: String,
}

#[derive(Deserialize)]
struct SkusResponse {
    #[serde(default)]
    skus: Vec<Sku>,
}

#[derive(Deserialize)]
struct CodespacesResponse {
    #[serde(default)]
    codespaces: Vec<Codespace>,
}

#[derive(Deserialize)]
struct TokenResponse {
    repository_token: String,
}

#[derive(Deserialize)]
struct PostCreateStatesResponse {
    #[serde(default)]
    states: Vec<PostCreateState>,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, token: &Token) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config.request_timeout())?,
            token: token.clone(),
            rest_url: config.rest_url.trim_end_matches('/').to_string(),
            graphql_url: config.graphql_url.clone(),
            regions_url: config.regions_url.clone(),
        })
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Absolute URL for `path`; `graphql` and full URLs are passed through.
    pub(crate) fn resolve_url(&self, path: &str) -> String {
        if path == "graphql" {
            self.graphql_url.clone()
        } else if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            format!("{}/{}", self.rest_url, path.trim_start_matches('/'))
        }
    }

    /// Request authenticated with the personal token.
    pub(crate) fn authed(&self, method: Method, url: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Accept", ACCEPT)
            .header("Authorization", format!("token {}", self.token.expose()))
    }

    /// Request authenticated with a codespace token.
    fn codespace_authed(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("Accept", ACCEPT)
            .header("Authorization", format!("Bearer {token}"))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
    ) -> Result<T, ApiError> {
        let request = self.authed(Method::GET, &self.resolve_url(path));
        let response = self.http.send_checked(request, operation).await?;
        decode_json(response, operation).await
    }

    /// Run a GraphQL query and decode its `data`.
    pub async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        let request = self
            .authed(Method::POST, &self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }));
        let response = self.http.send_checked(request, "graphql").await?;
        let body: GraphQlResponse<T> = decode_json(response, "graphql").await?;

        if !body.errors.is_empty() {
            return Err(ApiError::GraphQl(
                body.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        body.data
            .ok_or_else(|| ApiError::Decode("graphql: response has no data".to_string()))
    }

    pub async fn list_gpg_keys(&self) -> Result<Vec<GpgKey>, ApiError> {
        self.get_json("user/gpg_keys", "listing GPG keys").await
    }

    /// Request cancellation of a workflow run. Succeeds on 202.
    pub async fn cancel_run(&self, repo: &RepoRef, run_id: u64) -> Result<(), ApiError> {
        let path = format!(
            "repos/{}/{}/actions/runs/{run_id}/cancel",
            repo.owner, repo.name
        );
        let request = self.authed(Method::POST, &self.resolve_url(&path));
        self.http.send_checked(request, "canceling run").await?;
        Ok(())
    }

    pub async fn repository_details(&self, repo: &RepoRef) -> Result<RepositoryDetails, ApiError> {
        #[derive(Deserialize)]
        struct Data {
            repository: Option<RepositoryDetails>,
        }

        const QUERY: &str = "query RepositoryInfo($owner: String!, $name: String!) {
  repository(owner: $owner, name: $name) {
    nameWithOwner
    description
    url
    stargazerCount
    forkCount
    isPrivate
    defaultBranchRef { name }
  }
}";
        let data: Data = self
            .graphql(QUERY, json!({ "owner": repo.owner, "name": repo.name }))
            .await?;
        data.repository
            .ok_or_else(|| ApiError::NotFound(format!("repository {repo}")))
    }
}

#[async_trait]
impl CodespacesApi for ApiClient {
    async fn get_user(&self) -> Result<User, ApiError> {
        self.get_json("user", "getting user").await
    }

    async fn get_region_location(&self) -> Result<String, ApiError> {
        let request = self.http.request(Method::GET, &self.regions_url);
        let response = self.http.send_checked(request, "getting region").await?;
        let region: RegionResponse = decode_json(response, "getting region").await?;
        Ok(region.current)
    }

    async fn get_repository(&self, nwo: &str) -> Result<Repository, ApiError> {
        let repo = RepoRef::parse(nwo).map_err(|e| ApiError::NotFound(e.to_string()))?;
        self.get_json(
            &format!("repos/{}/{}", repo.owner, repo.name),
            "getting repository",
        )
        .await
    }

    async fn get_skus(
        &self,
        user: &User,
        repository: &Repository,
        branch: &str,
        location: &str,
    ) -> Result<Vec<Sku>, ApiError> {
        let url = with_query(
            &self.resolve_url(&format!("vscs_internal/user/{}/skus", user.login)),
            &[
                ("location", location),
                ("repository_id", &repository.id.to_string()),
                ("ref", branch),
            ],
        );
        let request = self.authed(Method::GET, &url);
        let response = self.http.send_checked(request, "getting machine types").await?;
        let body: SkusResponse = decode_json(response, "getting machine types").await?;
        Ok(body.skus)
    }

    async fn create_codespace(
        &self,
        user: &User,
        params: &CreateCodespaceParams,
    ) -> Result<Codespace, ApiError> {
        let url = self.resolve_url(&format!("vscs_internal/user/{}/codespaces", user.login));
        let request = self.authed(Method::POST, &url).json(params);
        let response = self.http.send_checked(request, "creating codespace").await?;
        decode_json(response, "creating codespace").await
    }

    async fn get_codespace_token(&self, owner_login: &str, name: &str) -> Result<String, ApiError> {
        let url = self.resolve_url(&format!(
            "vscs_internal/user/{owner_login}/codespaces/{name}/token"
        ));
        let request = self
            .authed(Method::POST, &url)
            .json(&json!({ "mint_repository_token": true }));
        let response = self.http.send_checked(request, "getting codespace token").await?;
        let body: TokenResponse = decode_json(response, "getting codespace token").await?;
        Ok(body.repository_token)
    }

    async fn get_codespace(
        &self,
        token: &str,
        owner_login: &str,
        name: &str,
    ) -> Result<Codespace, ApiError> {
        let url = with_query(
            &self.resolve_url(&format!(
                "vscs_internal/user/{owner_login}/codespaces/{name}"
            )),
            &[("internal", "true"), ("refresh", "true")],
        );
        let request = self.codespace_authed(Method::GET, &url, token);
        let response = self.http.send_checked(request, "getting codespace").await?;
        let codespace: Codespace = decode_json(response, "getting codespace").await?;
        debug!(
            codespace = %codespace.name,
            state = %codespace.environment.state,
            "fetched codespace"
        );
        Ok(codespace)
    }

    async fn start_codespace(&self, token: &str, codespace: &Codespace) -> Result<(), ApiError> {
        let url = self.resolve_url(&format!(
            "vscs_internal/user/{}/codespaces/{}/start",
            codespace.owner_login, codespace.name
        ));
        let request = self.codespace_authed(Method::POST, &url, token);
        self.http.send_checked(request, "starting codespace").await?;
        Ok(())
    }

    async fn list_codespaces(&self, user: &User) -> Result<Vec<Codespace>, ApiError> {
        let body: CodespacesResponse = self
            .get_json(
                &format!("vscs_internal/user/{}/codespaces", user.login),
                "listing codespaces",
            )
            .await?;
        Ok(body.codespaces)
    }

    async fn delete_codespace(&self, user: &User, name: &str) -> Result<(), ApiError> {
        let url = self.resolve_url(&format!(
            "vscs_internal/user/{}/codespaces/{name}",
            user.login
        ));
        let request = self.authed(Method::DELETE, &url);
        self.http.send_checked(request, "deleting codespace").await?;
        Ok(())
    }

    async fn get_post_create_states(
        &self,
        token: &str,
        codespace: &Codespace,
    ) -> Result<Vec<PostCreateState>, ApiError> {
        let url = self.resolve_url(&format!(
            "vscs_internal/user/{}/codespaces/{}/post_create_states",
            codespace.owner_login, codespace.name
        ));
        let request = self.codespace_authed(Method::GET, &url, token);
        let response = self
            .http
            .send_checked(request, "getting post-create states")
            .await?;
        let body: PostCreateStatesResponse =
            decode_json(response, "getting post-create states").await?;
        Ok(body.states)
    }
}
