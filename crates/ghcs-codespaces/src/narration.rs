//! Drives the post-create reducer from a polling loop.

use std::future::Future;
use std::time::Duration;

use ghcs_api::PostCreateState;
use ghcs_utils::context::Context;
use ghcs_utils::error::CodespaceError;
use tracing::debug;

use crate::poller::until_done;
use crate::reducer::{PostCreateReducer, TickOutcome};
use crate::sink::ProgressSink;

pub const DEFAULT_MAX_TICKS: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrationConfig {
    pub interval: Duration,
    /// Hard cap on polls before giving up with [`CodespaceError::NarrationTimeout`]
    pub max_ticks: u32,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_ticks: DEFAULT_MAX_TICKS,
        }
    }
}

/// Poll setup snapshots and narrate them until two quiet ticks in a row.
///
/// `poll` is called once per tick, first immediately and then after each
/// `interval`. A poll error or a finished `ctx` ends the loop; an open
/// progress line is closed first so the error lands on its own line.
pub async fn run_post_create_narration<F, Fut>(
    ctx: &Context,
    mut poll: F,
    sink: &dyn ProgressSink,
    config: &NarrationConfig,
) -> Result<(), CodespaceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Vec<PostCreateState>, CodespaceError>>,
{
    let mut reducer = PostCreateReducer::new();

    let close_line = |reducer: &PostCreateReducer| {
        if reducer.narrated().is_some() {
            sink.println("");
        }
    };

    for tick in 0..config.max_ticks {
        if tick > 0
            && let Err(err) = until_done(ctx, tokio::time::sleep(config.interval)).await
        {
            close_line(&reducer);
            return Err(err);
        }

        let snapshot = match until_done(ctx, poll()).await.and_then(|polled| polled) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                close_line(&reducer);
                return Err(err);
            }
        };

        debug!(tick, states = snapshot.len(), "post-create snapshot");
        if reducer.apply_and_render(&snapshot, sink) == TickOutcome::Complete {
            return Ok(());
        }
    }

    close_line(&reducer);
    Err(CodespaceError::NarrationTimeout {
        ticks: config.max_ticks,
    })
}
