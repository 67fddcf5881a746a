//! Waits for a codespace to become available with a live session.

use std::future::Future;
use std::time::Duration;

use ghcs_api::{Codespace, CodespaceState, CodespacesApi};
use ghcs_utils::context::Context;
use ghcs_utils::error::CodespaceError;
use tracing::debug;

use crate::sink::ProgressSink;

/// Default number of fetches before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Readiness polling knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Pause between fetches, applied from the third attempt on
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Run `fut` unless `ctx` finishes first. Cancellation wins ties.
pub async fn until_done<F, T>(ctx: &Context, fut: F) -> Result<T, CodespaceError>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        reason = ctx.done() => Err(reason.into()),
        value = fut => Ok(value),
    }
}

/// Start `codespace` if needed and poll until it is ready.
///
/// Returns the last fetched handle. A failed fetch is returned immediately,
/// never retried. [`CodespaceError::ReadinessTimeout`] means the attempt
/// budget ran out; [`CodespaceError::Canceled`] and
/// [`CodespaceError::DeadlineExceeded`] mean `ctx` gave up first.
pub async fn poll_until_ready(
    ctx: &Context,
    api: &dyn CodespacesApi,
    sink: &dyn ProgressSink,
    token: &str,
    mut codespace: Codespace,
    config: &PollConfig,
) -> Result<Codespace, CodespaceError> {
    if let Some(reason) = ctx.err() {
        return Err(reason.into());
    }

    if codespace.environment.state != CodespaceState::Available {
        sink.println("Starting your codespace...");
        until_done(ctx, api.start_codespace(token, &codespace))
            .await?
            .map_err(|err| CodespaceError::api("starting codespace", err))?;
    }

    let mut retries: u32 = 0;
    while !codespace.is_ready() {
        if retries == config.max_attempts {
            if retries > 2 {
                sink.print("\n");
            }
            return Err(CodespaceError::ReadinessTimeout { attempts: retries });
        }

        if retries > 1 {
            if retries % 2 == 0 {
                sink.print(".");
            }
            until_done(ctx, tokio::time::sleep(config.interval)).await?;
        }

        debug!(codespace = %codespace.name, attempt = retries + 1, "fetching codespace");
        codespace = until_done(
            ctx,
            api.get_codespace(token, &codespace.owner_login, &codespace.name),
        )
        .await?
        .map_err(|err| CodespaceError::api("getting codespace", err))?;
        retries += 1;
    }

    // A dot went out at the third attempt.
    if retries > 2 {
        sink.print("\n");
    }

    debug!(codespace = %codespace.name, attempts = retries, "codespace ready");
    Ok(codespace)
}
