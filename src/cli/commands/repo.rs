//! Repo command implementations
//!
//! Handles `ghcs repo view|create|fork`.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use crossterm::style::Color;
use ghcs_api::{ForkedRepository, NewRepository, RepoRef, RepositoryDetails, Visibility};
use ghcs_codespaces::{Context, until_done};
use ghcs_utils::error::GhcsError;
use tracing::debug;

use super::common::{api_client, paint, use_color};
use crate::Config;
use crate::cli::args::RepoCreateArgs;

/// Fallback for `repo view` without an argument.
pub const REPO_ENV: &str = "GH_REPO";

/// Pick the repository from the argument, then `$GH_REPO`.
pub fn resolve_repository(
    given: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RepoRef, GhcsError> {
    let raw = match given {
        Some(repo) => repo.to_string(),
        None => env(REPO_ENV).filter(|v| !v.is_empty()).ok_or_else(|| {
            GhcsError::Usage(format!(
                "no repository given; pass OWNER/REPO or set {REPO_ENV}"
            ))
        })?,
    };
    Ok(RepoRef::parse(&raw)?)
}

/// Execute `repo view`.
pub async fn execute_repo_view_command(config: &Config, repository: Option<&str>) -> Result<()> {
    let repo = resolve_repository(repository, |key| std::env::var(key).ok())?;
    let client = api_client(config)?;

    let details = client
        .repository_details(&repo)
        .await
        .map_err(GhcsError::from)?;

    print!("{}", format_repository(&details, use_color()));
    Ok(())
}

/// Name of the git repository enclosing `start`, if any.
pub fn enclosing_repository_name(start: &Path) -> Option<String> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .and_then(|root| root.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

/// Turn `repo create` arguments into a request. `NAME` creates under the
/// user, `ORG/NAME` under an organization.
pub fn new_repository(args: &RepoCreateArgs, cwd: &Path) -> Result<NewRepository, GhcsError> {
    let (owner, name) = match args.name.as_deref() {
        Some(name) if name.contains('/') => {
            let repo = RepoRef::parse(name)?;
            (Some(repo.owner), repo.name)
        }
        Some(name) if !name.trim().is_empty() => (None, name.trim().to_string()),
        _ => {
            let name = enclosing_repository_name(cwd).ok_or_else(|| {
                GhcsError::Usage(
                    "not inside a git repository; pass a name for the new repository".to_string(),
                )
            })?;
            (None, name)
        }
    };

    if args.team.is_some() && owner.is_none() {
        return Err(GhcsError::Usage(
            "--team requires an ORG/NAME repository name".to_string(),
        ));
    }

    Ok(NewRepository {
        name,
        owner,
        team: args.team.clone(),
        description: args.description.clone(),
        homepage: args.homepage.clone(),
        visibility: if args.public {
            Visibility::Public
        } else {
            Visibility::Private
        },
        has_issues: args.enable_issues,
        has_wiki: args.enable_wiki,
    })
}

/// Execute `repo create`.
pub async fn execute_repo_create_command(
    ctx: &Context,
    config: &Config,
    args: &RepoCreateArgs,
) -> Result<()> {
    let cwd = std::env::current_dir().map_err(GhcsError::from)?;
    let request = new_repository(args, &cwd)?;
    let client = api_client(config)?;

    let created = until_done(ctx, client.create_repository(&request))
        .await
        .map_err(GhcsError::from)?
        .map_err(GhcsError::from)?;

    if std::io::stdout().is_terminal() {
        println!(
            "{} Created repository {} on GitHub",
            paint("✓", Color::Green),
            created.name_with_owner
        );
    } else {
        println!("{}", created.url);
    }
    Ok(())
}

/// Status line for a fork. A fork created more than a minute ago already
/// existed; without a terminal only that case is reported.
#[must_use]
pub fn fork_message(fork: &ForkedRepository, now: DateTime<Utc>, tty: bool) -> Option<String> {
    let existed = now - fork.created_at > Duration::minutes(1);
    match (existed, tty) {
        (true, true) => Some(format!(
            "{} {} already exists",
            paint("!", Color::Yellow),
            fork.full_name
        )),
        (true, false) => Some(format!("{} already exists", fork.full_name)),
        (false, true) => Some(format!(
            "{} Created fork {}",
            paint("✓", Color::Green),
            fork.full_name
        )),
        (false, false) => None,
    }
}

/// Execute `repo fork`.
pub async fn execute_repo_fork_command(
    ctx: &Context,
    config: &Config,
    repository: Option<&str>,
) -> Result<()> {
    let repo = resolve_repository(repository, |key| std::env::var(key).ok())?;
    let client = api_client(config)?;

    let tty = std::io::stderr().is_terminal();
    if tty {
        eprintln!("{}", paint(&format!("- Forking {repo}..."), Color::Grey));
    }
    let fork = until_done(ctx, client.fork_repository(&repo))
        .await
        .map_err(GhcsError::from)?
        .map_err(GhcsError::from)?;
    debug!(fork = %fork.full_name, created_at = %fork.created_at, "forked");

    if let Some(message) = fork_message(&fork, Utc::now(), tty) {
        eprintln!("{message}");
    }
    Ok(())
}

/// Human-readable summary. Without a terminal the output is `key:\tvalue` lines.
#[must_use]
pub fn format_repository(details: &RepositoryDetails, tty: bool) -> String {
    let description = details.description.as_deref().unwrap_or("");
    let visibility = if details.is_private { "private" } else { "public" };
    let branch = details
        .default_branch_ref
        .as_ref()
        .map_or("", |b| b.name.as_str());

    if !tty {
        return format!(
            "name:\t{}\ndescription:\t{}\nvisibility:\t{}\ndefault_branch:\t{}\nstars:\t{}\nforks:\t{}\nurl:\t{}\n",
            details.name_with_owner,
            description,
            visibility,
            branch,
            details.stargazer_count,
            details.fork_count,
            details.url,
        );
    }

    let mut out = format!("{}\n", paint(&details.name_with_owner, Color::Cyan));
    if description.is_empty() {
        out.push_str(&paint("No description provided", Color::Grey));
    } else {
        out.push_str(description);
    }
    out.push_str("\n\n");
    out.push_str(&format!("Visibility:      {visibility}\n"));
    if !branch.is_empty() {
        out.push_str(&format!("Default branch:  {branch}\n"));
    }
    out.push_str(&format!(
        "Stars: {}  Forks: {}\n",
        details.stargazer_count, details.fork_count
    ));
    out.push_str(&paint(
        &format!("View this repository on GitHub: {}", details.url),
        Color::Grey,
    ));
    out.push('\n');
    out
}
