//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Creates the tokio runtime and the root cancellation context
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;
use ghcs_codespaces::{Context, CreateOptions};
use ghcs_utils::logging::init_tracing;
use ghcs_utils::redaction::redact_error_message;
use tracing::debug;

use super::args::{
    Cli, CodespaceCommands, Commands, GpgKeyCommands, IssueCommands, RepoCommands, RunCommands,
};
use super::commands;
use crate::error_reporter::{ReportedError, create_contextual_report};
use crate::prompt::LinePrompter;
use crate::{CliArgs, Config, ExitCode, GhcsError};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints error message via contextual reporting, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        verbose: cli.verbose.then_some(true),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", create_contextual_report(&err, "config"));
            return Err(err.to_exit_code());
        }
    };

    if let Err(e) = init_tracing(config.defaults.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    // Determine operation context for better error reporting before moving cli.command
    let operation = operation_name(&cli.command);
    debug!(operation, "dispatching");

    let result = rt.block_on(async {
        let (ctx, cancel) = Context::background().with_cancel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        dispatch(&ctx, &config, cli.command).await
    });

    if let Err(error) = result {
        return Err(report_error(&error, operation));
    }

    Ok(())
}

fn operation_name(command: &Commands) -> &'static str {
    match command {
        Commands::Codespace(CodespaceCommands::Create { .. }) => "codespace create",
        Commands::Codespace(CodespaceCommands::List) => "codespace list",
        Commands::Codespace(CodespaceCommands::Delete { .. }) => "codespace delete",
        Commands::Codespace(CodespaceCommands::Start { .. }) => "codespace start",
        Commands::Api(_) => "api",
        Commands::Repo(RepoCommands::View { .. }) => "repo view",
        Commands::Repo(RepoCommands::Create(_)) => "repo create",
        Commands::Repo(RepoCommands::Fork { .. }) => "repo fork",
        Commands::Issue(IssueCommands::Edit(_)) => "issue edit",
        Commands::GpgKey(GpgKeyCommands::List) => "gpg-key list",
        Commands::Run(RunCommands::Cancel { .. }) => "run cancel",
        Commands::Config => "config",
    }
}

async fn dispatch(ctx: &Context, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Codespace(command) => {
            let prompter = LinePrompter::stdin();
            match command {
                CodespaceCommands::Create {
                    repo,
                    branch,
                    machine,
                    status,
                } => {
                    let opts = CreateOptions {
                        repo,
                        branch,
                        machine,
                        show_status: status,
                    };
                    commands::execute_create_command(ctx, config, &prompter, opts).await
                }
                CodespaceCommands::List => commands::execute_list_command(ctx, config).await,
                CodespaceCommands::Delete { codespace } => {
                    commands::execute_delete_command(ctx, config, &prompter, codespace).await
                }
                CodespaceCommands::Start { codespace } => {
                    commands::execute_start_command(ctx, config, &prompter, codespace).await
                }
            }
        }
        Commands::Api(args) => commands::execute_api_command(config, &args).await,
        Commands::Repo(RepoCommands::View { repository }) => {
            commands::execute_repo_view_command(config, repository.as_deref()).await
        }
        Commands::Repo(RepoCommands::Create(args)) => {
            commands::execute_repo_create_command(ctx, config, &args).await
        }
        Commands::Repo(RepoCommands::Fork { repository }) => {
            commands::execute_repo_fork_command(ctx, config, repository.as_deref()).await
        }
        Commands::Issue(IssueCommands::Edit(args)) => {
            let prompter = LinePrompter::stdin();
            commands::execute_issue_edit_command(ctx, config, &prompter, &args).await
        }
        Commands::GpgKey(GpgKeyCommands::List) => {
            commands::execute_gpg_key_list_command(config).await
        }
        Commands::Run(RunCommands::Cancel { run_id, repo }) => {
            commands::execute_run_cancel_command(config, &repo, run_id).await
        }
        Commands::Config => commands::execute_config_command(config),
    }
}

/// Print `error` (unless a command already did) and pick the exit code.
fn report_error(error: &anyhow::Error, operation: &str) -> ExitCode {
    if let Some(reported) = error.downcast_ref::<ReportedError>() {
        return reported.0;
    }

    if let Some(ghcs_error) = error.downcast_ref::<GhcsError>() {
        eprintln!("{}", create_contextual_report(ghcs_error, operation));
        return ghcs_error.to_exit_code();
    }

    eprintln!(
        "✗ Unexpected error: {}",
        redact_error_message(&error.to_string())
    );
    if let Some(suggestions) = enhance_error_context(error) {
        eprintln!("\n  Suggestions:");
        for (i, suggestion) in suggestions.iter().enumerate() {
            eprintln!("    {}. {}", i + 1, suggestion);
        }
    }
    eprintln!("\n  Run with --verbose for more detailed output");

    ExitCode::INTERNAL
}

/// Suggestions for failures that never became a `GhcsError`.
fn enhance_error_context(error: &anyhow::Error) -> Option<Vec<String>> {
    let error_str = error.to_string();

    if error_str.contains("Broken pipe") {
        Some(vec![
            "The reader of this command's output exited early".to_string(),
        ])
    } else if error_str.contains("Permission denied") {
        Some(vec![
            "Check file and directory permissions".to_string(),
            "Ensure the file passed to --input is readable".to_string(),
        ])
    } else {
        None
    }
}
