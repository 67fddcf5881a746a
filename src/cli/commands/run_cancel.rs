//! Run command implementation

use anyhow::Result;
use crossterm::style::Color;
use ghcs_api::RepoRef;
use ghcs_utils::error::{ApiError, GhcsError};
use ghcs_utils::exit_codes::ExitCode;

use super::common::{api_client, paint};
use crate::Config;
use crate::error_reporter::ReportedError;

/// Execute `run cancel`.
pub async fn execute_run_cancel_command(config: &Config, repo: &str, run_id: u64) -> Result<()> {
    let repo = RepoRef::parse(repo).map_err(GhcsError::from)?;
    let client = api_client(config)?;

    match client.cancel_run(&repo, run_id).await {
        Ok(()) => {
            println!(
                "{} You have successfully requested the workflow to be canceled.",
                paint("✓", Color::Green)
            );
            Ok(())
        }
        Err(err) => match cancel_failure(&err, run_id) {
            Some((message, code)) => {
                eprintln!("{message}");
                Err(ReportedError(code).into())
            }
            None => Err(GhcsError::from(err).into()),
        },
    }
}

/// Message and exit code for failures that have a run-specific explanation.
fn cancel_failure(err: &ApiError, run_id: u64) -> Option<(String, ExitCode)> {
    match err {
        ApiError::NotFound(_) => Some((
            format!("Could not find any workflow run with ID {run_id}"),
            ExitCode::NOT_FOUND,
        )),
        ApiError::Conflict(_) => Some((
            "Cannot cancel a workflow run that is completed".to_string(),
            ExitCode::API_FAILURE,
        )),
        _ => None,
    }
}
