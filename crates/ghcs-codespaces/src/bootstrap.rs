//! Concurrent user and region lookups.
//!
//! Both lookups start the moment [`launch_bootstrap`] is called and each
//! delivers exactly one [`BootstrapResult`] through its own oneshot slot.
//! The caller receives them later, in any order, after doing local work
//! such as prompting for a repository.

use std::future::Future;
use std::sync::Arc;

use ghcs_api::{CodespacesApi, User};
use ghcs_utils::context::Context;
use ghcs_utils::error::{ApiError, BootstrapLookup, CodespaceError};
use tokio::sync::oneshot;
use tracing::debug;

/// Outcome of one background lookup.
pub type BootstrapResult<T> = Result<T, CodespaceError>;

/// Receive side of a single-slot lookup result.
#[derive(Debug)]
pub struct BootstrapChannel<T> {
    lookup: BootstrapLookup,
    rx: oneshot::Receiver<BootstrapResult<T>>,
}

impl<T> BootstrapChannel<T> {
    /// Wait for the lookup to deliver. Errors come back wrapped with the
    /// lookup that produced them.
    pub async fn recv(self) -> BootstrapResult<T> {
        let delivered = match self.rx.await {
            Ok(result) => result,
            // The task always sends before exiting; a dropped sender means
            // the runtime tore it down.
            Err(_) => Err(CodespaceError::Canceled),
        };
        delivered.map_err(|source| CodespaceError::Bootstrap {
            lookup: self.lookup,
            source: Box::new(source),
        })
    }

    #[must_use]
    pub fn lookup(&self) -> BootstrapLookup {
        self.lookup
    }
}

/// The two channels handed back by [`launch_bootstrap`].
#[derive(Debug)]
pub struct BootstrapHandles {
    pub user: BootstrapChannel<User>,
    pub region: BootstrapChannel<String>,
}

/// Start the user and region lookups in the background and return at once.
///
/// Each task races its call against `ctx`, so cancelling the context still
/// fills the slot (with [`CodespaceError::Canceled`] or
/// [`CodespaceError::DeadlineExceeded`]) and the receiver never hangs.
/// Must be called from within a tokio runtime.
pub fn launch_bootstrap(ctx: &Context, api: Arc<dyn CodespacesApi>) -> BootstrapHandles {
    let user_api = Arc::clone(&api);
    let user = spawn_lookup(ctx.clone(), BootstrapLookup::User, "getting user", async move {
        user_api.get_user().await
    });

    let region = spawn_lookup(
        ctx.clone(),
        BootstrapLookup::Region,
        "getting region location",
        async move { api.get_region_location().await },
    );

    BootstrapHandles { user, region }
}

fn spawn_lookup<T, F>(
    ctx: Context,
    lookup: BootstrapLookup,
    operation: &'static str,
    call: F,
) -> BootstrapChannel<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let result = tokio::select! {
            reason = ctx.done() => Err(CodespaceError::from(reason)),
            res = call => res.map_err(|err| CodespaceError::api(operation, err)),
        };
        debug!(%lookup, ok = result.is_ok(), "bootstrap lookup finished");
        // The receiver may have been dropped if the command bailed out early.
        let _ = tx.send(result);
    });

    BootstrapChannel { lookup, rx }
}
