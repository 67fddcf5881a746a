//! Error reporting for the CLI.
//!
//! [`create_contextual_report`] extends `GhcsError::display_for_user()` with
//! hints tied to the command that failed. Commands that already printed their
//! own failure return [`ReportedError`] so nothing is printed twice.

use ghcs_utils::error::{ApiError, CodespaceError, ErrorCategory, GhcsError, UserFriendlyError};
use ghcs_utils::exit_codes::ExitCode;
use ghcs_utils::redaction::redact_error_message;
use thiserror::Error;

/// A failure whose message is already on stderr; only the exit code remains.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("command failed with exit code {}", .0.as_i32())]
pub struct ReportedError(pub ExitCode);

/// Exit code for a non-success HTTP status.
#[must_use]
pub fn exit_code_for_status(status: u16) -> ExitCode {
    match status {
        401 | 403 => ExitCode::AUTH,
        404 => ExitCode::NOT_FOUND,
        _ => ExitCode::API_FAILURE,
    }
}

/// Full report for `error` raised while running `operation`.
#[must_use]
pub fn create_contextual_report(error: &GhcsError, operation: &str) -> String {
    let mut report = error.display_for_user();

    let hints = operation_hints(error, operation);
    if !hints.is_empty() {
        report.push_str(&format!("\nWhile running `{operation}`:\n"));
        for hint in hints {
            report.push_str(&format!("  • {hint}\n"));
        }
    }

    redact_error_message(report.trim_end())
}

fn operation_hints(error: &GhcsError, operation: &str) -> Vec<String> {
    let mut hints = Vec::new();

    if operation.starts_with("codespace") {
        match error {
            GhcsError::Codespace(CodespaceError::ReadinessTimeout { .. }) => {
                hints.push("Raise codespaces.max_ready_attempts in .ghcs/config.toml to wait longer".to_string());
            }
            GhcsError::Codespace(CodespaceError::NarrationTimeout { .. }) => {
                hints.push("The codespace was created; its setup may still be running".to_string());
                hints.push("Raise codespaces.max_status_ticks to keep watching longer".to_string());
            }
            GhcsError::Codespace(err) if err.is_cancellation() => {
                hints.push("A codespace that was already requested keeps provisioning on the server".to_string());
            }
            _ => {}
        }
    }

    if let GhcsError::Api(ApiError::Auth(_)) = error {
        hints.push("Check that GITHUB_TOKEN or GH_TOKEN holds a valid token".to_string());
    }

    if error.category() == ErrorCategory::Configuration
        && operation != "config"
        && !error.suggestions().iter().any(|s| s.contains("ghcs config"))
    {
        hints.push("Run `ghcs config` to see the effective configuration".to_string());
    }

    hints
}
