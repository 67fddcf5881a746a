//! Scripted fakes for the codespace flows.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ghcs_api::{
    Codespace, CodespaceConnection, CodespaceEnvironment, CodespaceState, CodespacesApi,
    CreateCodespaceParams, PostCreateState, Repository, Sku, User,
};
use ghcs_utils::error::{ApiError, PromptError};

use crate::prompt::Prompter;

pub(crate) fn codespace(name: &str, state: CodespaceState, session_id: &str) -> Codespace {
    Codespace {
        name: name.to_string(),
        owner_login: "monalisa".to_string(),
        created_at: chrono::DateTime::parse_from_rfc3339("2021-08-01T10:00:00Z")
            .unwrap()
            .into(),
        repository_nwo: "octo/widgets".to_string(),
        branch: "main".to_string(),
        environment: CodespaceEnvironment {
            state,
            connection: CodespaceConnection {
                session_id: session_id.to_string(),
                session_token: "session-token".to_string(),
                relay_endpoint: String::new(),
            },
        },
    }
}

pub(crate) fn sku(name: &str, display_name: &str) -> Sku {
    Sku {
        name: name.to_string(),
        display_name: display_name.to_string(),
    }
}

/// Responses are consumed front to back; the last one repeats forever.
#[derive(Debug)]
pub(crate) struct Script<T>(Mutex<VecDeque<T>>);

impl<T: Clone> Script<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self(Mutex::new(items.into()))
    }

    fn next(&self) -> Option<T> {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

pub(crate) struct FakeApi {
    pub user: Result<User, ApiError>,
    pub user_delay: Duration,
    pub region: Result<String, ApiError>,
    pub region_delay: Duration,
    pub repository: Result<Repository, ApiError>,
    pub skus: Result<Vec<Sku>, ApiError>,
    pub created: Result<Codespace, ApiError>,
    pub start: Result<(), ApiError>,
    pub listed: Vec<Codespace>,
    pub codespaces: Script<Result<Codespace, ApiError>>,
    pub post_create: Script<Result<Vec<PostCreateState>, ApiError>>,
    pub calls: Mutex<HashMap<&'static str, usize>>,
    pub create_params: Mutex<Option<CreateCodespaceParams>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            user: Ok(User {
                login: "monalisa".to_string(),
            }),
            user_delay: Duration::ZERO,
            region: Ok("WestUs2".to_string()),
            region_delay: Duration::ZERO,
            repository: Ok(Repository {
                id: 42,
                full_name: "octo/widgets".to_string(),
                default_branch: Some("main".to_string()),
            }),
            skus: Ok(vec![sku("basicLinux", "2 cores, 4 GB RAM, 32 GB storage")]),
            created: Ok(codespace("monalisa-widgets-1", CodespaceState::Provisioning, "")),
            start: Ok(()),
            listed: Vec::new(),
            codespaces: Script::new(vec![Ok(codespace(
                "monalisa-widgets-1",
                CodespaceState::Available,
                "session-1",
            ))]),
            post_create: Script::new(vec![Ok(Vec::new())]),
            calls: Mutex::new(HashMap::new()),
            create_params: Mutex::new(None),
        }
    }
}

impl FakeApi {
    pub(crate) fn with_codespaces(mut self, responses: Vec<Result<Codespace, ApiError>>) -> Self {
        self.codespaces = Script::new(responses);
        self
    }

    pub(crate) fn with_post_create(
        mut self,
        responses: Vec<Result<Vec<PostCreateState>, ApiError>>,
    ) -> Self {
        self.post_create = Script::new(responses);
        self
    }

    pub(crate) fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
    }
}

#[async_trait]
impl CodespacesApi for FakeApi {
    async fn get_user(&self) -> Result<User, ApiError> {
        self.record("get_user");
        tokio::time::sleep(self.user_delay).await;
        self.user.clone()
    }

    async fn get_region_location(&self) -> Result<String, ApiError> {
        self.record("get_region_location");
        tokio::time::sleep(self.region_delay).await;
        self.region.clone()
    }

    async fn get_repository(&self, _nwo: &str) -> Result<Repository, ApiError> {
        self.record("get_repository");
        self.repository.clone()
    }

    async fn get_skus(
        &self,
        _user: &User,
        _repository: &Repository,
        _branch: &str,
        _location: &str,
    ) -> Result<Vec<Sku>, ApiError> {
        self.record("get_skus");
        self.skus.clone()
    }

    async fn create_codespace(
        &self,
        _user: &User,
        params: &CreateCodespaceParams,
    ) -> Result<Codespace, ApiError> {
        self.record("create_codespace");
        *self.create_params.lock().unwrap() = Some(params.clone());
        self.created.clone()
    }

    async fn get_codespace_token(&self, _owner: &str, _name: &str) -> Result<String, ApiError> {
        self.record("get_codespace_token");
        Ok("codespace-token".to_string())
    }

    async fn get_codespace(
        &self,
        _token: &str,
        _owner: &str,
        _name: &str,
    ) -> Result<Codespace, ApiError> {
        self.record("get_codespace");
        self.codespaces
            .next()
            .unwrap_or_else(|| Err(ApiError::NotFound("no scripted codespace".to_string())))
    }

    async fn start_codespace(&self, _token: &str, _codespace: &Codespace) -> Result<(), ApiError> {
        self.record("start_codespace");
        self.start.clone()
    }

    async fn list_codespaces(&self, _user: &User) -> Result<Vec<Codespace>, ApiError> {
        self.record("list_codespaces");
        Ok(self.listed.clone())
    }

    async fn delete_codespace(&self, _user: &User, _name: &str) -> Result<(), ApiError> {
        self.record("delete_codespace");
        Ok(())
    }

    async fn get_post_create_states(
        &self,
        _token: &str,
        _codespace: &Codespace,
    ) -> Result<Vec<PostCreateState>, ApiError> {
        self.record("get_post_create_states");
        self.post_create.next().unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Answers prompts from queues and records what was asked.
#[derive(Default)]
pub(crate) struct ScriptedPrompter {
    inputs: Mutex<VecDeque<String>>,
    selections: Mutex<VecDeque<usize>>,
    pub asked: Mutex<Vec<(String, Vec<String>)>>,
}

impl ScriptedPrompter {
    pub(crate) fn new(inputs: &[&str], selections: &[usize]) -> Self {
        Self {
            inputs: Mutex::new(inputs.iter().map(|s| (*s).to_string()).collect()),
            selections: Mutex::new(selections.iter().copied().collect()),
            asked: Mutex::new(Vec::new()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, message: &str, field: &str) -> Result<String, PromptError> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), Vec::new()));
        self.inputs
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PromptError::NotInteractive {
                field: field.to_string(),
            })
    }

    fn input_with_default(
        &self,
        message: &str,
        _field: &str,
        default: &str,
    ) -> Result<String, PromptError> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), Vec::new()));
        Ok(self
            .inputs
            .lock()
            .unwrap()
            .pop_front()
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    fn multi_select(
        &self,
        message: &str,
        options: &[String],
        defaults: &[usize],
    ) -> Result<Vec<usize>, PromptError> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), options.to_vec()));
        Ok(defaults.to_vec())
    }

    fn select(&self, message: &str, options: &[String], _default: usize) -> Result<usize, PromptError> {
        self.asked
            .lock()
            .unwrap()
            .push((message.to_string(), options.to_vec()));
        self.selections
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PromptError::InvalidSelection("no scripted selection".to_string()))
    }
}
