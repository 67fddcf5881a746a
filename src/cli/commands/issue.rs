//! Issue command implementation
//!
//! `issue edit` changes any of title, body, assignees, labels, projects and
//! milestone. With no flag it asks which fields to change and then asks for
//! each new value, starting from the current one.

use anyhow::Result;
use ghcs_api::{
    CodespacesApi, Issue, IssueUpdate, MetadataWanted, NamedId, RepoMetadata, RepoRef,
};
use ghcs_codespaces::{Context, Prompter, until_done};
use ghcs_utils::error::{ApiError, GhcsError, PromptError};
use tracing::debug;

use super::common::api_client;
use super::repo::resolve_repository;
use crate::Config;
use crate::cli::args::IssueEditArgs;

const FIELDS: [&str; 6] = ["Title", "Body", "Assignees", "Labels", "Projects", "Milestone"];
const NO_MILESTONE: &str = "(none)";

/// The changes to make. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableOptions {
    pub title: Option<String>,
    pub body: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
    pub projects: Option<Vec<String>>,
    /// An empty name removes the milestone.
    pub milestone: Option<String>,
}

fn names(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values.map(|values| {
        values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    })
}

impl EditableOptions {
    #[must_use]
    pub fn from_args(args: &IssueEditArgs) -> Self {
        Self {
            title: args.title.clone(),
            body: args.body.clone(),
            assignees: names(args.assignees.clone()),
            labels: names(args.labels.clone()),
            projects: names(args.projects.clone()),
            milestone: args.milestone.as_ref().map(|m| m.trim().to_string()),
        }
    }

    /// Whether any field is set to change.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.title.is_some()
            || self.body.is_some()
            || self.assignees.is_some()
            || self.labels.is_some()
            || self.projects.is_some()
            || self.milestone.is_some()
    }

    #[must_use]
    pub fn metadata_wanted(&self) -> MetadataWanted {
        MetadataWanted {
            assignees: self.assignees.is_some(),
            labels: self.labels.is_some(),
            projects: self.projects.is_some(),
            milestones: self.milestone.is_some(),
        }
    }

    /// Replace `@me` in the assignees with `viewer`.
    pub fn replace_me(&mut self, viewer: &str) {
        if let Some(assignees) = &mut self.assignees {
            for login in assignees.iter_mut() {
                if login.eq_ignore_ascii_case("@me") {
                    *login = viewer.to_string();
                }
            }
        }
    }

    #[must_use]
    pub fn mentions_me(&self) -> bool {
        self.assignees
            .as_ref()
            .is_some_and(|a| a.iter().any(|login| login.eq_ignore_ascii_case("@me")))
    }
}

/// `23`, `#23` or `https://HOST/OWNER/REPO/issues/23`. A URL also names the
/// repository.
pub fn parse_issue_arg(arg: &str) -> Result<(Option<RepoRef>, u64), GhcsError> {
    let invalid = || GhcsError::Usage(format!("invalid issue format: {arg:?}"));
    let trimmed = arg.trim();

    if let Ok(number) = trimmed.trim_start_matches('#').parse::<u64>() {
        return Ok((None, number));
    }

    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(invalid)?;
    let mut parts = rest.trim_end_matches('/').split('/');
    match (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) {
        (Some(_host), Some(owner), Some(repo), Some("issues"), Some(number), None) => {
            let repo = RepoRef::parse(&format!("{owner}/{repo}")).map_err(|_| invalid())?;
            let number = number.parse().map_err(|_| invalid())?;
            Ok((Some(repo), number))
        }
        _ => Err(invalid()),
    }
}

/// Ask which fields to edit; each chosen field starts at its current value.
pub fn choose_fields(
    prompter: &dyn Prompter,
    opts: &mut EditableOptions,
    issue: &Issue,
) -> Result<(), PromptError> {
    let fields: Vec<String> = FIELDS.iter().map(|f| (*f).to_string()).collect();
    for index in prompter.multi_select("What would you like to edit?", &fields, &[])? {
        match FIELDS[index] {
            "Title" => opts.title = Some(issue.title.clone()),
            "Body" => opts.body = Some(issue.body.clone()),
            "Assignees" => opts.assignees = Some(issue.assignees.clone()),
            "Labels" => opts.labels = Some(issue.labels.clone()),
            "Projects" => opts.projects = Some(issue.projects.clone()),
            _ => opts.milestone = Some(issue.milestone.clone().unwrap_or_default()),
        }
    }
    Ok(())
}

fn pick_names(
    prompter: &dyn Prompter,
    message: &str,
    known: &[NamedId],
    current: &[String],
) -> Result<Vec<String>, PromptError> {
    let options: Vec<String> = known.iter().map(|k| k.name.clone()).collect();
    let defaults: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, name)| current.iter().any(|c| c.eq_ignore_ascii_case(name)))
        .map(|(i, _)| i)
        .collect();
    let chosen = prompter.multi_select(message, &options, &defaults)?;
    Ok(chosen.into_iter().map(|i| options[i].clone()).collect())
}

/// Ask for the new value of every field marked for editing.
pub fn edit_fields(
    prompter: &dyn Prompter,
    opts: &mut EditableOptions,
    metadata: &RepoMetadata,
) -> Result<(), PromptError> {
    if let Some(title) = &opts.title {
        opts.title = Some(prompter.input_with_default("Title", "title", title)?);
    }
    if let Some(body) = &opts.body {
        opts.body = Some(prompter.input_with_default("Body", "body", body)?);
    }
    if let Some(current) = &opts.assignees {
        opts.assignees = Some(pick_names(
            prompter,
            "Assignees",
            &metadata.assignable_users,
            current,
        )?);
    }
    if let Some(current) = &opts.labels {
        opts.labels = Some(pick_names(prompter, "Labels", &metadata.labels, current)?);
    }
    if let Some(current) = &opts.projects {
        opts.projects = Some(pick_names(prompter, "Projects", &metadata.projects, current)?);
    }
    if let Some(current) = &opts.milestone {
        let mut options = vec![NO_MILESTONE.to_string()];
        options.extend(metadata.milestones.iter().map(|m| m.name.clone()));
        let default = options
            .iter()
            .position(|m| !current.is_empty() && m.eq_ignore_ascii_case(current))
            .unwrap_or(0);
        let chosen = prompter.select("Milestone", &options, default)?;
        opts.milestone = Some(if chosen == 0 {
            String::new()
        } else {
            options[chosen].clone()
        });
    }
    Ok(())
}

/// Resolve names to node IDs for the mutation.
pub fn build_update(
    issue_id: &str,
    opts: &EditableOptions,
    metadata: &RepoMetadata,
) -> Result<IssueUpdate, ApiError> {
    let milestone_id = match opts.milestone.as_deref() {
        None => None,
        Some("") => Some(None),
        Some(title) => Some(Some(metadata.milestone_to_id(title)?)),
    };
    Ok(IssueUpdate {
        id: issue_id.to_string(),
        title: opts.title.clone(),
        body: opts.body.clone(),
        assignee_ids: opts
            .assignees
            .as_deref()
            .map(|logins| metadata.members_to_ids(logins))
            .transpose()?,
        label_ids: opts
            .labels
            .as_deref()
            .map(|labels| metadata.labels_to_ids(labels))
            .transpose()?,
        project_ids: opts
            .projects
            .as_deref()
            .map(|projects| metadata.projects_to_ids(projects))
            .transpose()?,
        milestone_id,
    })
}

/// Execute `issue edit`.
pub async fn execute_issue_edit_command(
    ctx: &Context,
    config: &Config,
    prompter: &dyn Prompter,
    args: &IssueEditArgs,
) -> Result<()> {
    let mut opts = EditableOptions::from_args(args);
    let interactive = !opts.is_dirty();
    if interactive && !prompter.is_interactive() {
        return Err(GhcsError::Usage(
            "--title, --body, --assignee, --label, --project, or --milestone required when not running interactively"
                .to_string(),
        )
        .into());
    }

    let (from_url, number) = parse_issue_arg(&args.issue)?;
    let repo = match from_url {
        Some(repo) => repo,
        None => resolve_repository(args.repo.as_deref(), |key| std::env::var(key).ok())?,
    };
    let client = api_client(config)?;

    let issue = until_done(ctx, client.issue(&repo, number))
        .await
        .map_err(GhcsError::from)?
        .map_err(GhcsError::from)?;

    if interactive {
        choose_fields(prompter, &mut opts, &issue).map_err(GhcsError::from)?;
        if !opts.is_dirty() {
            return Err(GhcsError::Usage("nothing to edit".to_string()).into());
        }
    }

    debug!(issue = issue.number, %repo, "fetching repository metadata");
    let metadata = until_done(ctx, client.repo_metadata(&repo, opts.metadata_wanted()))
        .await
        .map_err(GhcsError::from)?
        .map_err(GhcsError::from)?;

    if interactive {
        edit_fields(prompter, &mut opts, &metadata).map_err(GhcsError::from)?;
    }

    if opts.mentions_me() {
        let viewer = until_done(ctx, client.get_user())
            .await
            .map_err(GhcsError::from)?
            .map_err(GhcsError::from)?;
        opts.replace_me(&viewer.login);
    }

    let update = build_update(&issue.id, &opts, &metadata).map_err(GhcsError::from)?;
    until_done(ctx, client.update_issue(&update))
        .await
        .map_err(GhcsError::from)?
        .map_err(GhcsError::from)?;

    println!("{}", issue.url);
    Ok(())
}
