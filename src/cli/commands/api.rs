//! Api command implementation
//!
//! Handles `ghcs api <endpoint>`: one authenticated request, response body
//! on stdout, server error message on stderr.

use std::io::{Read, Write};

use anyhow::Result;
use ghcs_api::rest::{parse_fields, parse_header, resolve_method};
use ghcs_api::{RawRequest, RawResponse, RequestError};
use ghcs_utils::error::GhcsError;
use ghcs_utils::exit_codes::ExitCode;
use tracing::debug;

use super::common::use_color;
use crate::Config;
use crate::cli::args::ApiArgs;
use crate::error_reporter::{ReportedError, exit_code_for_status};

fn usage(err: RequestError) -> GhcsError {
    GhcsError::Usage(err.to_string())
}

/// Turn command-line arguments into a request. `stdin` backs `@-` and `--input -`.
pub fn build_request(args: &ApiArgs, stdin: &mut dyn Read) -> Result<RawRequest, GhcsError> {
    let params = parse_fields(&args.raw_fields, &args.fields, stdin).map_err(usage)?;

    let input = match args.input.as_deref() {
        None => None,
        Some("-") => {
            let mut body = Vec::new();
            stdin
                .read_to_end(&mut body)
                .map_err(|e| GhcsError::Usage(format!("error reading request body from stdin: {e}")))?;
            Some(body)
        }
        Some(path) => Some(
            std::fs::read(path)
                .map_err(|e| GhcsError::Usage(format!("error reading input file {path}: {e}")))?,
        ),
    };

    let method = resolve_method(args.method.as_deref(), !params.is_empty(), input.is_some())
        .map_err(usage)?;

    let headers = args
        .headers
        .iter()
        .map(|h| parse_header(h))
        .collect::<Result<Vec<_>, _>>()
        .map_err(usage)?;

    Ok(RawRequest {
        method,
        path: args.endpoint.clone(),
        params,
        headers,
        input,
    })
}

/// Execute the api command.
pub async fn execute_api_command(config: &Config, args: &ApiArgs) -> Result<()> {
    let request = build_request(args, &mut std::io::stdin().lock())?;
    debug!(method = %request.method, path = %request.path, "api request");

    let client = super::common::api_client(config)?;
    let response = client.raw_request(request).await.map_err(GhcsError::from)?;

    let mut stdout = std::io::stdout().lock();
    write_response(&mut stdout, &response, args, use_color())?;
    stdout.flush()?;

    if let Some(code) = report_failure(&response, &args.endpoint)? {
        return Err(ReportedError(code).into());
    }
    Ok(())
}

/// Print status line and headers (with `-i`) and the body.
pub fn write_response(
    out: &mut dyn Write,
    response: &RawResponse,
    args: &ApiArgs,
    pretty: bool,
) -> std::io::Result<()> {
    if args.include {
        out.write_all(response.format_headers().as_bytes())?;
    }
    if response.status == 204 {
        return Ok(());
    }

    if pretty
        && response.is_json()
        && let Ok(value) = serde_json::from_slice::<serde_json::Value>(&response.body)
    {
        let rendered = serde_json::to_string_pretty(&value).map_err(std::io::Error::other)?;
        return writeln!(out, "{rendered}");
    }
    out.write_all(&response.body)
}

/// Print the server's error message, if any, and return the exit code to use.
fn report_failure(
    response: &RawResponse,
    endpoint: &str,
) -> Result<Option<ExitCode>, GhcsError> {
    if response.status == 204 {
        return Ok(None);
    }
    let server_error = response.server_error(endpoint)?;

    if let Some(message) = server_error {
        eprintln!("ghcs: {message}");
        let code = if response.status > 299 {
            exit_code_for_status(response.status)
        } else {
            ExitCode::API_FAILURE
        };
        return Ok(Some(code));
    }
    if response.status > 299 {
        eprintln!("ghcs: HTTP {}", response.status);
        return Ok(Some(exit_code_for_status(response.status)));
    }
    Ok(None)
}
