//! Gpg-key command implementation

use anyhow::Result;
use chrono::SecondsFormat;
use ghcs_api::GpgKey;
use ghcs_utils::error::{ApiError, GhcsError};
use ghcs_utils::exit_codes::ExitCode;

use super::common::{api_client, render_table, terminal_width, truncate_middle};
use crate::Config;
use crate::error_reporter::ReportedError;

/// Narrowest public key column before truncation stops making sense.
const MIN_KEY_WIDTH: usize = 10;

/// Execute `gpg-key list`.
pub async fn execute_gpg_key_list_command(config: &Config) -> Result<()> {
    let client = api_client(config)?;

    let keys = match client.list_gpg_keys().await {
        Ok(keys) => keys,
        Err(ApiError::NotFound(_)) => {
            eprintln!("Error: insufficient OAuth scopes to list GPG keys");
            eprintln!("Grant the read:gpg_key scope to your token and try again");
            return Err(ReportedError(ExitCode::AUTH).into());
        }
        Err(err) => return Err(GhcsError::from(err).into()),
    };

    if keys.is_empty() {
        eprintln!("No GPG keys present in GitHub account.");
        return Err(ReportedError(ExitCode::INTERNAL).into());
    }

    print!("{}", format_gpg_keys(&keys, terminal_width()));
    Ok(())
}

/// Key ID, expiry and public key; the key is cut in the middle to fit `width`.
#[must_use]
pub fn format_gpg_keys(keys: &[GpgKey], width: usize) -> String {
    let cells: Vec<(String, String)> = keys
        .iter()
        .map(|key| {
            let expires = key
                .expires_at
                .map_or_else(
                    || "Never".to_string(),
                    |at| at.to_rfc3339_opts(SecondsFormat::Secs, true),
                );
            (key.key_id.clone(), expires)
        })
        .collect();

    let id_width = cells.iter().map(|(id, _)| id.chars().count()).max().unwrap_or(0);
    let expires_width = cells.iter().map(|(_, e)| e.chars().count()).max().unwrap_or(0);
    let key_width = width
        .saturating_sub(id_width + expires_width + 4)
        .max(MIN_KEY_WIDTH);

    let rows: Vec<Vec<String>> = cells
        .into_iter()
        .zip(keys)
        .map(|((id, expires), key)| vec![id, expires, truncate_middle(key_width, &key.public_key)])
        .collect();
    render_table(&rows)
}
