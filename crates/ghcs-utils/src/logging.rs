//! Tracing setup for the CLI.
//!
//! Diagnostics go to stderr through `tracing`; user-facing progress text is
//! written separately so `RUST_LOG` never changes what a command prints.

use std::io::IsTerminal;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::redaction::redact_error_message;

/// Default filter directives when `RUST_LOG` is not set.
#[must_use]
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "ghcs=debug,info"
    } else {
        "ghcs=info,warn"
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise [`default_filter`] applies. Verbose
/// mode adds targets and span close events.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let ansi = std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(ansi)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(ansi)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Log a failed remote operation with its message redacted.
pub fn log_operation_error(operation: &str, error: &str) {
    let sanitized = redact_error_message(error);
    tracing::warn!(operation = %operation, error = %sanitized, "operation failed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(true), "ghcs=debug,info");
        assert_eq!(default_filter(false), "ghcs=info,warn");
    }

    #[test]
    fn test_filters_parse() {
        assert!(EnvFilter::try_new(default_filter(true)).is_ok());
        assert!(EnvFilter::try_new(default_filter(false)).is_ok());
    }
}
