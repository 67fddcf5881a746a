//! Command-line interface for ghcs
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations and helpers
//! - `tests`: Test module (cfg(test) only)

pub mod args;
mod commands;
mod run;


// Re-export argument types
pub use args::{Cli, Commands, IssueCommands, RepoCommands, build_cli};

// Re-export run function
pub use run::run;
