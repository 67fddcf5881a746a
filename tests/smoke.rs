//! Smoke tests for the ghcs binary
//!
//! Each test runs the real binary in an isolated directory with the
//! token and endpoint variables cleared. Commands that talk to the API are
//! pointed at a one-shot local server.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::thread::JoinHandle;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLEARED_VARS: &[&str] = &[
    "GITHUB_TOKEN",
    "GH_TOKEN",
    "GH_REPO",
    "GHCS_REST_URL",
    "GHCS_GRAPHQL_URL",
    "GHCS_VERBOSE",
    "RUST_LOG",
];

/// Isolated working directory; the `.git` marker stops config discovery.
fn workdir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();
    dir
}

fn ghcs(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ghcs"));
    cmd.current_dir(dir)
        .env("GHCS_CONFIG_DIR", dir.join("user-config"))
        .env("NO_COLOR", "1");
    for var in CLEARED_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Answer the first connection with `status` and `body`; the handle yields
/// the request text.
fn serve_once(status: &str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let status = status.to_string();

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 8192];
        let n = stream.read(&mut buf).unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).into_owned();

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        request
    });
    (base, handle)
}

#[test]
fn test_help_lists_commands() {
    let dir = workdir();
    ghcs(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("codespace"))
        .stdout(predicate::str::contains("gpg-key"));
}

#[test]
fn test_config_shows_defaults() {
    let dir = workdir();
    ghcs(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Config file: none"))
        .stdout(predicate::str::contains("max_ready_attempts = 30 (from default)"))
        .stdout(predicate::str::contains("token = unset (from default)"));
}

#[test]
fn test_config_reports_file_and_env_sources() {
    let dir = workdir();
    std::fs::create_dir_all(dir.path().join(".ghcs")).unwrap();
    std::fs::write(
        dir.path().join(".ghcs/config.toml"),
        "[codespaces]\nmax_ready_attempts = 5\n",
    )
    .unwrap();

    ghcs(dir.path())
        .arg("config")
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_ready_attempts = 5 (from config)"))
        .stdout(predicate::str::contains("token = set (from env)"))
        .stdout(predicate::str::contains("ghp_smoketest").not());
}

#[test]
fn test_missing_token_is_usage_error() {
    let dir = workdir();
    ghcs(dir.path())
        .args(["gpg-key", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No authentication token"));
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = workdir();
    ghcs(dir.path())
        .args(["--config", "missing.toml", "config"])
        .assert()
        .code(2);
}

#[test]
fn test_repo_view_without_repository() {
    let dir = workdir();
    ghcs(dir.path())
        .args(["repo", "view"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("GH_REPO"));
}

#[test]
fn test_run_cancel_success() {
    let dir = workdir();
    let (base, server) = serve_once("202 Accepted", "{}");

    ghcs(dir.path())
        .args(["run", "cancel", "1234", "-R", "octo/widgets"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .env("GHCS_REST_URL", &base)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "You have successfully requested the workflow to be canceled.",
        ));

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /repos/octo/widgets/actions/runs/1234/cancel "));
}

#[test]
fn test_run_cancel_unknown_run() {
    let dir = workdir();
    let (base, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#);

    ghcs(dir.path())
        .args(["run", "cancel", "1234", "-R", "octo/widgets"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .env("GHCS_REST_URL", &base)
        .assert()
        .code(5)
        .stderr(predicate::str::contains(
            "Could not find any workflow run with ID 1234",
        ));
    server.join().unwrap();
}

#[test]
fn test_api_prints_body() {
    let dir = workdir();
    let (base, server) = serve_once("200 OK", r#"{"login":"monalisa"}"#);

    ghcs(dir.path())
        .args(["api", "user"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .env("GHCS_REST_URL", &base)
        .assert()
        .success()
        .stdout(r#"{"login":"monalisa"}"#);

    let request = server.join().unwrap();
    assert!(request.starts_with("GET /user "));
    assert!(request.to_ascii_lowercase().contains("authorization: token ghp_smoketest"));
}

#[test]
fn test_api_not_found_exit_code() {
    let dir = workdir();
    let (base, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#);

    ghcs(dir.path())
        .args(["api", "repos/octo/missing"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .env("GHCS_REST_URL", &base)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("ghcs: Not Found"));
    server.join().unwrap();
}

#[test]
fn test_issue_edit_without_flags_needs_terminal() {
    let dir = workdir();
    ghcs(dir.path())
        .args(["issue", "edit", "23", "-R", "octo/widgets"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("required when not running interactively"));
}

#[test]
fn test_repo_fork_reports_existing_fork() {
    let dir = workdir();
    let (base, server) = serve_once(
        "202 Accepted",
        r#"{"full_name":"monalisa/widgets","clone_url":"https://github.com/monalisa/widgets.git","created_at":"2021-08-01T10:00:00Z"}"#,
    );

    ghcs(dir.path())
        .args(["repo", "fork", "octo/widgets"])
        .env("GITHUB_TOKEN", "ghp_smoketestsmoketestsmoketest")
        .env("GHCS_REST_URL", &base)
        .assert()
        .success()
        .stderr(predicate::str::contains("monalisa/widgets already exists"));

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /repos/octo/widgets/forks "));
}
