//! Redaction of credentials from messages before they are logged or shown.

use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern to match URLs with embedded credentials
static URL_WITH_CREDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://)[^:@\s]+:[^@\s]+@").expect("valid regex"));

/// Pattern to match token prefixes issued by the service (ghp_, gho_, ghu_, ghs_, ghr_)
static SERVICE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"gh[pousr]_[A-Za-z0-9]{20,}").expect("valid regex"));

/// Pattern to match potential API keys (long alphanumeric strings)
static POTENTIAL_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_-])[A-Za-z0-9_-]{32,}(?:[^A-Za-z0-9_-]|$)").expect("valid regex")
});

/// Pattern to match bearer/token authorization header values
static AUTH_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)((?:bearer|token)\s+)[^\s,;]+").expect("valid regex"));

/// Redact sensitive information from an error message.
///
/// Redaction rules:
/// - URLs with embedded credentials keep scheme and host only
/// - authorization header values are replaced
/// - service tokens and other long key-like strings are replaced
pub fn redact_error_message(message: &str) -> String {
    let redacted = URL_WITH_CREDS.replace_all(message, "$1[REDACTED]@");
    let redacted = AUTH_HEADER.replace_all(&redacted, "$1[REDACTED]");
    let redacted = SERVICE_TOKEN.replace_all(&redacted, "[REDACTED_TOKEN]");
    let redacted = POTENTIAL_KEY.replace_all(&redacted, "[REDACTED_KEY]");
    redacted.to_string()
}
