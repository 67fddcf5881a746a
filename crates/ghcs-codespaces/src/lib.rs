//! Codespace provisioning and status polling.
//!
//! The pieces, leaves first:
//!
//! - [`bootstrap`]: user and region lookups launched concurrently, each
//!   delivering exactly one result
//! - [`poller`]: waits for a codespace to become available with a session
//! - [`reducer`]: turns post-create state snapshots into one line per step
//! - [`narration`]: drives the reducer from a polling loop until setup is quiet
//! - [`create`], [`choose`], [`session`]: the command flows built on top

pub mod bootstrap;
pub mod choose;
pub mod create;
pub mod narration;
pub mod poller;
pub mod prompt;
pub mod reducer;
pub mod session;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use bootstrap::{BootstrapChannel, BootstrapHandles, BootstrapResult, launch_bootstrap};
pub use choose::{choose_codespace, sort_by_created_at};
pub use create::{CodespaceSettings, CreateOptions, create_codespace, machine_label, select_machine};
pub use ghcs_utils::context::Context;
pub use ghcs_utils::error::CodespaceError;
pub use narration::{NarrationConfig, run_post_create_narration};
pub use poller::{PollConfig, poll_until_ready, until_done};
pub use prompt::Prompter;
pub use reducer::{NarrationEvent, PostCreateReducer, Tick, TickOutcome};
pub use session::{SessionConnector, SessionCredentials, connect_to_session};
pub use sink::{BufferSink, ProgressSink, TerminalSink};
