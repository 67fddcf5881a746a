//! Codespace command implementations
//!
//! Handles `ghcs codespace create|list|delete|start`.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use ghcs_api::{Codespace, CodespacesApi, User};
use ghcs_codespaces::{
    CodespaceError, Context, CreateOptions, ProgressSink, Prompter, SessionConnector,
    SessionCredentials, TerminalSink, choose_codespace, connect_to_session, create_codespace,
    sort_by_created_at, until_done,
};
use ghcs_utils::error::GhcsError;
use tracing::debug;

use super::common::{api_client, codespace_settings, poll_config, render_table};
use crate::Config;

/// Execute `codespace create`.
pub async fn execute_create_command(
    ctx: &Context,
    config: &Config,
    prompter: &dyn Prompter,
    opts: CreateOptions,
) -> Result<()> {
    let api: Arc<dyn CodespacesApi> = Arc::new(api_client(config)?);
    let sink = TerminalSink;

    let codespace = create_codespace(
        ctx,
        api,
        prompter,
        &sink,
        &opts,
        &codespace_settings(config),
    )
    .await
    .map_err(GhcsError::from)?;

    sink.print("Codespace created: ");
    println!("{}", codespace.name);
    Ok(())
}

/// Execute `codespace list`.
pub async fn execute_list_command(ctx: &Context, config: &Config) -> Result<()> {
    let api = api_client(config)?;
    let user = current_user(ctx, &api).await?;

    let mut codespaces = until_done(ctx, api.list_codespaces(&user))
        .await
        .map_err(GhcsError::from)?
        .map_err(|err| GhcsError::from(CodespaceError::api("getting codespaces", err)))?;

    if codespaces.is_empty() {
        eprintln!("{}", CodespaceError::NoCodespaces);
        return Ok(());
    }

    sort_by_created_at(&mut codespaces);
    print!("{}", format_codespace_table(&codespaces));
    Ok(())
}

/// Execute `codespace delete`.
pub async fn execute_delete_command(
    ctx: &Context,
    config: &Config,
    prompter: &dyn Prompter,
    name: Option<String>,
) -> Result<()> {
    let api = api_client(config)?;
    let user = current_user(ctx, &api).await?;

    let name = match name {
        Some(name) => name,
        None => {
            choose_codespace(ctx, &api, prompter, &user)
                .await
                .map_err(GhcsError::from)?
                .name
        }
    };

    until_done(ctx, api.delete_codespace(&user, &name))
        .await
        .map_err(GhcsError::from)?
        .map_err(|err| GhcsError::from(CodespaceError::api("deleting codespace", err)))?;

    TerminalSink.println("Codespace deleted.");
    Ok(())
}

/// Execute `codespace start`.
pub async fn execute_start_command(
    ctx: &Context,
    config: &Config,
    prompter: &dyn Prompter,
    name: Option<String>,
) -> Result<()> {
    let api = api_client(config)?;
    let user = current_user(ctx, &api).await?;

    let (codespace, token) = match name {
        Some(name) => {
            let token = codespace_token(ctx, &api, &user.login, &name).await?;
            let codespace = until_done(ctx, api.get_codespace(&token, &user.login, &name))
                .await
                .map_err(GhcsError::from)?
                .map_err(|err| GhcsError::from(CodespaceError::api("getting full codespace details", err)))?;
            (codespace, token)
        }
        None => {
            let codespace = choose_codespace(ctx, &api, prompter, &user)
                .await
                .map_err(GhcsError::from)?;
            let token =
                codespace_token(ctx, &api, &codespace.owner_login, &codespace.name).await?;
            (codespace, token)
        }
    };

    debug!(codespace = %codespace.name, state = %codespace.environment.state, "starting");
    connect_to_session(
        ctx,
        &api,
        &PrintingConnector,
        &TerminalSink,
        &token,
        codespace,
        &poll_config(config),
    )
    .await
    .map_err(GhcsError::from)?;
    Ok(())
}

async fn current_user(ctx: &Context, api: &dyn CodespacesApi) -> Result<User, GhcsError> {
    until_done(ctx, api.get_user())
        .await?
        .map_err(|err| CodespaceError::api("getting user", err).into())
}

async fn codespace_token(
    ctx: &Context,
    api: &dyn CodespacesApi,
    owner_login: &str,
    name: &str,
) -> Result<String, GhcsError> {
    until_done(ctx, api.get_codespace_token(owner_login, name))
        .await?
        .map_err(|err| CodespaceError::api("getting codespace token", err).into())
}

/// Prints the session details for an external transport to pick up.
struct PrintingConnector;

#[async_trait]
impl SessionConnector for PrintingConnector {
    async fn connect(&self, credentials: SessionCredentials) -> Result<(), CodespaceError> {
        if credentials.session_id.is_empty() {
            return Err(CodespaceError::Session(
                "codespace reported no session".to_string(),
            ));
        }
        println!("Codespace: {}", credentials.codespace);
        println!("Session ID: {}", credentials.session_id);
        if !credentials.relay_endpoint.is_empty() {
            println!("Relay endpoint: {}", credentials.relay_endpoint);
        }
        Ok(())
    }
}

/// Table of codespaces in the order given.
#[must_use]
pub fn format_codespace_table(codespaces: &[Codespace]) -> String {
    let mut rows = vec![vec![
        "NAME".to_string(),
        "REPOSITORY".to_string(),
        "BRANCH".to_string(),
        "STATE".to_string(),
        "CREATED AT".to_string(),
    ]];
    rows.extend(codespaces.iter().map(|c| {
        vec![
            c.name.clone(),
            c.repository_nwo.clone(),
            c.branch.clone(),
            c.environment.state.to_string(),
            c.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }));
    render_table(&rows)
}
