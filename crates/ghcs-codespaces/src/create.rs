//! The `codespace create` flow.

use std::sync::Arc;

use ghcs_api::{Codespace, CodespacesApi, CreateCodespaceParams, Repository, Sku, User};
use ghcs_utils::context::Context;
use ghcs_utils::error::{CodespaceError, PromptError};
use tracing::{debug, info};

use crate::bootstrap::launch_bootstrap;
use crate::narration::{NarrationConfig, run_post_create_narration};
use crate::poller::{PollConfig, poll_until_ready, until_done};
use crate::prompt::{Prompter, value_or_prompt};
use crate::sink::ProgressSink;

/// What the user asked for on the command line. `None` means prompt.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub machine: Option<String>,
    /// Wait for the codespace and narrate its post-create setup
    pub show_status: bool,
}

/// Polling settings for the status display.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodespaceSettings {
    pub poll: PollConfig,
    pub narration: NarrationConfig,
}

/// Create a codespace, overlapping the user and region lookups with the
/// repository and branch prompts.
pub async fn create_codespace(
    ctx: &Context,
    api: Arc<dyn CodespacesApi>,
    prompter: &dyn Prompter,
    sink: &dyn ProgressSink,
    opts: &CreateOptions,
    settings: &CodespaceSettings,
) -> Result<Codespace, CodespaceError> {
    let lookups = launch_bootstrap(ctx, Arc::clone(&api));

    let repo = value_or_prompt(opts.repo.as_deref(), prompter, "Repository", "repo")?;
    let branch = value_or_prompt(opts.branch.as_deref(), prompter, "Branch", "branch")?;

    let repository = until_done(ctx, api.get_repository(&repo))
        .await?
        .map_err(|err| CodespaceError::api("getting repository", err))?;

    let location = lookups.region.recv().await?;
    let user = lookups.user.recv().await?;
    debug!(user = %user.login, %location, repo = %repository.full_name, "bootstrap complete");

    let machine = select_machine(
        ctx,
        api.as_ref(),
        prompter,
        opts.machine.as_deref(),
        &user,
        &repository,
        &branch,
        &location,
    )
    .await?
    .ok_or(CodespaceError::NoMachines)?;

    sink.println("Creating your codespace...");

    let params = CreateCodespaceParams {
        repository_id: repository.id,
        branch,
        machine,
        location,
    };
    let codespace = until_done(ctx, api.create_codespace(&user, &params))
        .await?
        .map_err(|err| CodespaceError::api("creating codespace", err))?;
    info!(codespace = %codespace.name, machine = %params.machine, "codespace created");

    if !opts.show_status {
        return Ok(codespace);
    }

    show_status(ctx, api, sink, codespace, settings).await
}

async fn show_status(
    ctx: &Context,
    api: Arc<dyn CodespacesApi>,
    sink: &dyn ProgressSink,
    codespace: Codespace,
    settings: &CodespaceSettings,
) -> Result<Codespace, CodespaceError> {
    let token = until_done(
        ctx,
        api.get_codespace_token(&codespace.owner_login, &codespace.name),
    )
    .await?
    .map_err(|err| CodespaceError::api("getting codespace token", err))?;

    let ready = poll_until_ready(ctx, api.as_ref(), sink, &token, codespace, &settings.poll).await?;

    let poll = || {
        let api = Arc::clone(&api);
        let token = token.clone();
        let codespace = ready.clone();
        async move {
            api.get_post_create_states(&token, &codespace)
                .await
                .map_err(|err| CodespaceError::api("getting post-create states", err))
        }
    };
    run_post_create_narration(ctx, poll, sink, &settings.narration).await?;

    Ok(ready)
}

/// Resolve the machine type.
///
/// A requested machine must be one of the repository's SKUs. Without a
/// request the user picks from the list; `Ok(None)` means there was nothing
/// to pick from.
#[allow(clippy::too_many_arguments)]
pub async fn select_machine(
    ctx: &Context,
    api: &dyn CodespacesApi,
    prompter: &dyn Prompter,
    requested: Option<&str>,
    user: &User,
    repository: &Repository,
    branch: &str,
    location: &str,
) -> Result<Option<String>, CodespaceError> {
    let skus = until_done(ctx, api.get_skus(user, repository, branch, location))
        .await?
        .map_err(|err| CodespaceError::api("getting codespace skus", err))?;

    if let Some(requested) = requested.filter(|m| !m.is_empty()) {
        if skus.iter().any(|sku| sku.name == requested) {
            return Ok(Some(requested.to_string()));
        }
        return Err(CodespaceError::UnknownMachine {
            requested: requested.to_string(),
            available: skus.into_iter().map(|sku| sku.name).collect(),
        });
    }

    if skus.is_empty() {
        return Ok(None);
    }

    let labels: Vec<String> = skus.iter().map(machine_label).collect();
    let choice = prompter.select("Choose Machine Type:", &labels, 0)?;
    let sku = skus
        .into_iter()
        .nth(choice)
        .ok_or_else(|| PromptError::InvalidSelection(choice.to_string()))?;
    Ok(Some(sku.name))
}

/// `basicLinux` with display name `2 cores` becomes `Basic - 2 cores`.
#[must_use]
pub fn machine_label(sku: &Sku) -> String {
    format!("{} - {}", title_case(first_camel_word(&sku.name)), sku.display_name)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Other,
}

fn class(c: char) -> CharClass {
    if c.is_lowercase() {
        CharClass::Lower
    } else if c.is_uppercase() {
        CharClass::Upper
    } else if c.is_numeric() {
        CharClass::Digit
    } else {
        CharClass::Other
    }
}

/// Leading word of a camelCase identifier. An upper-case run followed by a
/// lower-case letter gives its last capital to the next word (`XLarge`).
fn first_camel_word(name: &str) -> &str {
    let chars: Vec<(usize, char)> = name.char_indices().collect();
    for i in 1..chars.len() {
        let prev = class(chars[i - 1].1);
        let cur = class(chars[i].1);
        let next = chars.get(i + 1).map(|&(_, c)| class(c));

        let boundary = match (prev, cur) {
            (CharClass::Upper, CharClass::Lower) => false,
            (CharClass::Upper, CharClass::Upper) => next == Some(CharClass::Lower),
            (a, b) => a != b,
        };
        if boundary {
            return &name[..chars[i].0];
        }
    }
    name
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
