//! Exit code constants and error mapping for ghcs.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid arguments, configuration or prompt failure |
//! | 4 | `AUTH` | Authentication rejected by the API |
//! | 5 | `NOT_FOUND` | Requested resource does not exist |
//! | 6 | `API_FAILURE` | Any other API failure |
//! | 10 | `TIMEOUT` | Codespace readiness or setup polling gave up |
//! | 130 | `CANCELED` | Interrupted or deadline exceeded |

use crate::error::{ApiError, CodespaceError, GhcsError};

/// Type-safe process exit code.
///
/// ```rust
/// use ghcs_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::TIMEOUT.as_i32(), 10);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    pub const AUTH: ExitCode = ExitCode(4);

    pub const NOT_FOUND: ExitCode = ExitCode(5);

    pub const API_FAILURE: ExitCode = ExitCode(6);

    /// Readiness or post-create polling exhausted its attempts
    pub const TIMEOUT: ExitCode = ExitCode(10);

    /// Interrupted by the user or a deadline (128 + SIGINT)
    pub const CANCELED: ExitCode = ExitCode(130);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

fn api_exit_code(err: &ApiError) -> ExitCode {
    match err {
        ApiError::Auth(_) => ExitCode::AUTH,
        ApiError::NotFound(_) => ExitCode::NOT_FOUND,
        ApiError::Timeout { .. } => ExitCode::TIMEOUT,
        _ => ExitCode::API_FAILURE,
    }
}

fn codespace_exit_code(err: &CodespaceError) -> ExitCode {
    match err {
        CodespaceError::Api { source, .. } => api_exit_code(source),
        CodespaceError::Bootstrap { source, .. } => codespace_exit_code(source),
        CodespaceError::ReadinessTimeout { .. } | CodespaceError::NarrationTimeout { .. } => {
            ExitCode::TIMEOUT
        }
        CodespaceError::Canceled | CodespaceError::DeadlineExceeded => ExitCode::CANCELED,
        CodespaceError::UnknownMachine { .. } | CodespaceError::Prompt(_) => ExitCode::CLI_ARGS,
        CodespaceError::NoMachines | CodespaceError::NoCodespaces => ExitCode::INTERNAL,
        CodespaceError::Session(_) => ExitCode::API_FAILURE,
    }
}

impl GhcsError {
    /// Map this error to the process exit code the CLI reports.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            GhcsError::Config(_) | GhcsError::Prompt(_) | GhcsError::Usage(_) => ExitCode::CLI_ARGS,
            GhcsError::Api(err) => api_exit_code(err),
            GhcsError::Codespace(err) => codespace_exit_code(err),
            GhcsError::Io(_) | GhcsError::Command(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BootstrapLookup, ConfigError, PromptError};

    #[test]
    fn test_exit_code_constants() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::AUTH.as_i32(), 4);
        assert_eq!(ExitCode::NOT_FOUND.as_i32(), 5);
        assert_eq!(ExitCode::API_FAILURE.as_i32(), 6);
        assert_eq!(ExitCode::TIMEOUT.as_i32(), 10);
        assert_eq!(ExitCode::CANCELED.as_i32(), 130);
    }

    #[test]
    fn test_error_mapping() {
        let cases: Vec<(GhcsError, ExitCode)> = vec![
            (ConfigError::MissingToken.into(), ExitCode::CLI_ARGS),
            (
                PromptError::NotInteractive {
                    field: "repo".to_string(),
                }
                .into(),
                ExitCode::CLI_ARGS,
            ),
            (
                ApiError::Auth("bad credentials".to_string()).into(),
                ExitCode::AUTH,
            ),
            (
                ApiError::NotFound("no run".to_string()).into(),
                ExitCode::NOT_FOUND,
            ),
            (
                ApiError::Server("boom".to_string()).into(),
                ExitCode::API_FAILURE,
            ),
            (
                CodespaceError::ReadinessTimeout { attempts: 30 }.into(),
                ExitCode::TIMEOUT,
            ),
            (CodespaceError::Canceled.into(), ExitCode::CANCELED),
            (
                CodespaceError::Bootstrap {
                    lookup: BootstrapLookup::User,
                    source: Box::new(CodespaceError::api(
                        "getting user",
                        ApiError::Auth("401".to_string()),
                    )),
                }
                .into(),
                ExitCode::AUTH,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_exit_code(), expected, "{err}");
        }
    }

    #[test]
    fn test_conversions() {
        let code: i32 = ExitCode::NOT_FOUND.into();
        assert_eq!(code, 5);
        assert_eq!(ExitCode::from(130), ExitCode::CANCELED);
    }
}
