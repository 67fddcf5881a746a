//! ghcs: a command-line client for repositories, workflow runs and codespaces.
//!
//! The binary is a thin wrapper around [`cli::run`]. The workspace crates
//! carry the rest:
//!
//! - `ghcs-utils`: errors, exit codes, cancellation context, logging, redaction
//! - `ghcs-config`: layered configuration with source attribution
//! - `ghcs-api`: REST and GraphQL client
//! - `ghcs-codespaces`: codespace provisioning, readiness polling and
//!   post-create narration

pub use ghcs_config::{CliArgs, Config};
pub use ghcs_utils::error::{ErrorCategory, GhcsError, UserFriendlyError};
pub use ghcs_utils::exit_codes::ExitCode;

#[doc(hidden)]
pub mod cli;
#[doc(hidden)]
pub mod error_reporter;
pub mod prompt;
