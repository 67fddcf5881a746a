//! CLI command implementations (facade).
//!
//! This module re-exports the command surface used by `run.rs`.
//! Implementations live in `commands/*`.

mod api;
mod codespace;
mod common;
mod config_cmd;
mod gpg_key;
mod issue;
mod repo;
mod run_cancel;

pub use api::execute_api_command;
pub use codespace::{
    execute_create_command, execute_delete_command, execute_list_command, execute_start_command,
};
pub use config_cmd::execute_config_command;
pub use gpg_key::execute_gpg_key_list_command;
pub use issue::execute_issue_edit_command;
pub use repo::{
    execute_repo_create_command, execute_repo_fork_command, execute_repo_view_command,
};
pub use run_cancel::execute_run_cancel_command;
