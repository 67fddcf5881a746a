use ghcs_api::{Codespace, CodespacesApi, User};
use ghcs_utils::context::Context;
use ghcs_utils::error::{CodespaceError, PromptError};

use crate::poller::until_done;
use crate::prompt::Prompter;

/// Newest first.
pub fn sort_by_created_at(codespaces: &mut [Codespace]) {
    codespaces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// List the user's codespaces and ask which one to use.
pub async fn choose_codespace(
    ctx: &Context,
    api: &dyn CodespacesApi,
    prompter: &dyn Prompter,
    user: &User,
) -> Result<Codespace, CodespaceError> {
    let mut codespaces = until_done(ctx, api.list_codespaces(user))
        .await?
        .map_err(|err| CodespaceError::api("getting codespaces", err))?;

    if codespaces.is_empty() {
        return Err(CodespaceError::NoCodespaces);
    }

    sort_by_created_at(&mut codespaces);
    let names: Vec<String> = codespaces.iter().map(|c| c.name.clone()).collect();
    let choice = prompter.select("Choose Codespace:", &names, 0)?;

    codespaces
        .into_iter()
        .nth(choice)
        .ok_or_else(|| PromptError::InvalidSelection(choice.to_string()).into())
}
