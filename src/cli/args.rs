//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// ghcs - command-line client for repositories, workflow runs and codespaces
#[derive(Parser, Debug)]
#[command(name = "ghcs")]
#[command(about = "Work with repositories, workflow runs and codespaces from the command line")]
#[command(long_about = r#"
ghcs talks to the REST and GraphQL APIs with the token found in GITHUB_TOKEN
or GH_TOKEN.

EXAMPLES:
  # Create a codespace and watch its setup
  ghcs codespace create -r octo/widgets -b main --status

  # Pick one of your codespaces and start it
  ghcs codespace start

  # Call any REST endpoint
  ghcs api repos/octo/widgets/releases -F per_page=5

  # Cancel a workflow run
  ghcs run cancel 1234 -R octo/widgets

  # Relabel an issue
  ghcs issue edit 23 -R octo/widgets --label bug,"help wanted"

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > environment > config file > defaults
  Config file is discovered by searching upward from CWD for .ghcs/config.toml
  Use --config to specify an explicit config file path
  Use `ghcs config` to see every effective value and where it came from
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, list, delete and start codespaces
    #[command(subcommand, alias = "cs")]
    Codespace(CodespaceCommands),

    /// Make an authenticated request and print the response
    Api(ApiArgs),

    /// Create, fork and view repositories
    #[command(subcommand)]
    Repo(RepoCommands),

    /// Work with issues
    #[command(subcommand)]
    Issue(IssueCommands),

    /// Manage GPG keys
    #[command(subcommand, name = "gpg-key")]
    GpgKey(GpgKeyCommands),

    /// Work with workflow runs
    #[command(subcommand)]
    Run(RunCommands),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Subcommand, Debug)]
pub enum CodespaceCommands {
    /// Create a codespace
    Create {
        /// Repository name with owner: user/repo
        #[arg(short, long)]
        repo: Option<String>,

        /// Repository branch
        #[arg(short, long)]
        branch: Option<String>,

        /// Hardware specifications for the VM
        #[arg(short, long)]
        machine: Option<String>,

        /// Show status of post-create command and dotfiles
        #[arg(short, long)]
        status: bool,
    },

    /// List your codespaces, newest first
    #[command(alias = "ls")]
    List,

    /// Delete a codespace
    Delete {
        /// Name of the codespace; prompts when omitted
        #[arg(short, long)]
        codespace: Option<String>,
    },

    /// Start a codespace and connect to its session
    Start {
        /// Name of the codespace; prompts when omitted
        #[arg(short, long)]
        codespace: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ApiArgs {
    /// REST path relative to the API root, a full URL, or `graphql`
    pub endpoint: String,

    /// The HTTP method for the request
    #[arg(short = 'X', long = "method")]
    pub method: Option<String>,

    /// Add a typed parameter in key=value format
    #[arg(short = 'F', long = "field")]
    pub fields: Vec<String>,

    /// Add a string parameter in key=value format
    #[arg(short = 'f', long = "raw-field")]
    pub raw_fields: Vec<String>,

    /// Add a HTTP request header in key:value format
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Include HTTP response status line and headers in the output
    #[arg(short, long)]
    pub include: bool,

    /// The file to use as body for the HTTP request ("-" for stdin)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// View a repository
    View {
        /// OWNER/REPO or a repository URL; defaults to $GH_REPO
        repository: Option<String>,
    },

    /// Create a new repository
    Create(RepoCreateArgs),

    /// Create a fork of a repository
    Fork {
        /// OWNER/REPO or a repository URL; defaults to $GH_REPO
        repository: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct RepoCreateArgs {
    /// NAME or ORG/NAME; defaults to the name of the enclosing git repository
    pub name: Option<String>,

    /// Description of repository
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Repository home page URL
    #[arg(long, default_value = "")]
    pub homepage: String,

    /// The name of the organization team to be granted access
    #[arg(short, long)]
    pub team: Option<String>,

    /// Enable issues in the new repository
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub enable_issues: bool,

    /// Enable wiki in the new repository
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub enable_wiki: bool,

    /// Make the new repository public (default: private)
    #[arg(long)]
    pub public: bool,
}

#[derive(Subcommand, Debug)]
pub enum IssueCommands {
    /// Edit an issue; prompts for the fields to change when no flag is given
    Edit(IssueEditArgs),
}

#[derive(Args, Debug)]
pub struct IssueEditArgs {
    /// Issue number or URL
    pub issue: String,

    /// Select another repository using the OWNER/REPO format
    #[arg(short = 'R', long = "repo")]
    pub repo: Option<String>,

    /// Revise the issue title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Revise the issue body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Set assigned people by their login; use "@me" to self-assign
    #[arg(short, long = "assignee", value_delimiter = ',')]
    pub assignees: Option<Vec<String>>,

    /// Set the issue labels by name
    #[arg(short, long = "label", value_delimiter = ',')]
    pub labels: Option<Vec<String>>,

    /// Set the projects the issue belongs to by name
    #[arg(short, long = "project", value_delimiter = ',')]
    pub projects: Option<Vec<String>>,

    /// Set the milestone the issue belongs to by name; empty clears it
    #[arg(short, long)]
    pub milestone: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum GpgKeyCommands {
    /// Lists GPG keys in your account
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum RunCommands {
    /// Cancel a workflow run
    Cancel {
        /// ID of the workflow run
        run_id: u64,

        /// Select another repository using the OWNER/REPO format
        #[arg(short = 'R', long = "repo")]
        repo: String,
    },
}

/// Build the clap command for testing and documentation purposes.
#[must_use]
pub fn build_cli() -> clap::Command {
    use clap::CommandFactory;
    Cli::command()
}
