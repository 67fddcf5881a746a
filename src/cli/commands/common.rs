//! Shared helpers for command implementations.

use std::io::IsTerminal;

use crossterm::style::{Color, Stylize};
use ghcs_api::ApiClient;
use ghcs_codespaces::{CodespaceSettings, NarrationConfig, PollConfig};
use ghcs_utils::error::GhcsError;

use crate::Config;

/// Authenticated client for the configured endpoints.
///
/// Fails with a configuration error when no token is available.
pub fn api_client(config: &Config) -> Result<ApiClient, GhcsError> {
    let token = config.require_token()?;
    Ok(ApiClient::new(&config.api, token)?)
}

#[must_use]
pub fn poll_config(config: &Config) -> PollConfig {
    PollConfig {
        interval: config.codespaces.poll_interval(),
        max_attempts: config.codespaces.max_ready_attempts,
    }
}

#[must_use]
pub fn codespace_settings(config: &Config) -> CodespaceSettings {
    CodespaceSettings {
        poll: poll_config(config),
        narration: NarrationConfig {
            interval: config.codespaces.status_interval(),
            max_ticks: config.codespaces.max_status_ticks,
        },
    }
}

/// Check if colored output should be used.
///
/// Returns true only if stdout is a terminal and `NO_COLOR` is unset.
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Paint `text` when color output is enabled.
pub fn paint(text: &str, color: Color) -> String {
    if use_color() {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

/// Width available for table output; 80 when stdout is not a terminal.
pub fn terminal_width() -> usize {
    if !std::io::stdout().is_terminal() {
        return 80;
    }
    crossterm::terminal::size()
        .map(|(cols, _)| usize::from(cols))
        .unwrap_or(80)
}

/// Shorten `text` to `max_width` characters by cutting out its middle.
#[must_use]
pub fn truncate_middle(max_width: usize, text: &str) -> String {
    const ELLIPSIS: &str = "...";

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        return text.to_string();
    }
    if max_width < ELLIPSIS.len() + 2 {
        return chars[..max_width].iter().collect();
    }

    let half = (max_width - ELLIPSIS.len()) / 2;
    let remainder = (max_width - ELLIPSIS.len()) % 2;
    let head: String = chars[..half + remainder].iter().collect();
    let tail: String = chars[chars.len() - half..].iter().collect();
    format!("{head}{ELLIPSIS}{tail}")
}

/// Left-aligned columns separated by two spaces. The last column is not padded.
#[must_use]
pub fn render_table(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in rows {
        let last = row.len().saturating_sub(1);
        for (i, cell) in row.iter().enumerate() {
            out.push_str(cell);
            if i < last {
                let pad = widths[i] - cell.chars().count() + 2;
                out.push_str(&" ".repeat(pad));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_middle() {
        assert_eq!(truncate_middle(10, "short"), "short");
        assert_eq!(truncate_middle(10, "abcdefghijklmnop"), "abcd...nop");
        assert_eq!(truncate_middle(11, "abcdefghijklmnop"), "abcd...mnop");
        assert_eq!(truncate_middle(4, "abcdefgh"), "abcd");
    }

    #[test]
    fn test_render_table_pads_all_but_last_column() {
        let rows = vec![
            vec!["a".to_string(), "long value".to_string(), "x".to_string()],
            vec!["bbb".to_string(), "v".to_string(), "y".to_string()],
        ];
        assert_eq!(render_table(&rows), "a    long value  x\nbbb  v           y\n");
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.codespaces.max_ready_attempts = 7;
        config.codespaces.max_status_ticks = 9;

        let settings = codespace_settings(&config);
        assert_eq!(settings.poll.max_attempts, 7);
        assert_eq!(settings.narration.max_ticks, 9);
        assert_eq!(settings.poll.interval, std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_api_client_requires_token() {
        let err = api_client(&Config::default()).unwrap_err();
        assert!(matches!(err, GhcsError::Config(_)));
    }
}
