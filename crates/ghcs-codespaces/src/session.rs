//! Hand-off of a ready codespace to the session transport.

use async_trait::async_trait;
use ghcs_api::{Codespace, CodespacesApi};
use ghcs_utils::context::Context;
use ghcs_utils::error::CodespaceError;
use tracing::info;

use crate::poller::{PollConfig, poll_until_ready};
use crate::sink::ProgressSink;

/// What a session transport needs to join a codespace.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub codespace: String,
    pub session_id: String,
    pub session_token: String,
    pub relay_endpoint: String,
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("codespace", &self.codespace)
            .field("session_id", &self.session_id)
            .field("session_token", &"[REDACTED]")
            .field("relay_endpoint", &self.relay_endpoint)
            .finish()
    }
}

impl From<Codespace> for SessionCredentials {
    fn from(codespace: Codespace) -> Self {
        let connection = codespace.environment.connection;
        Self {
            codespace: codespace.name,
            session_id: connection.session_id,
            session_token: connection.session_token,
            relay_endpoint: connection.relay_endpoint,
        }
    }
}

/// Joins a live session. Implementations own the credentials once called.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn connect(&self, credentials: SessionCredentials) -> Result<(), CodespaceError>;
}

/// Wait until `codespace` is ready, then hand its session to `connector`.
///
/// The handle is consumed; nothing here touches it after the hand-off.
pub async fn connect_to_session(
    ctx: &Context,
    api: &dyn CodespacesApi,
    connector: &dyn SessionConnector,
    sink: &dyn ProgressSink,
    token: &str,
    codespace: Codespace,
    config: &PollConfig,
) -> Result<(), CodespaceError> {
    let ready = poll_until_ready(ctx, api, sink, token, codespace, config).await?;

    sink.println("Connecting to your codespace...");
    info!(codespace = %ready.name, "handing off session");
    connector.connect(SessionCredentials::from(ready)).await
}
