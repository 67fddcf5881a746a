//! Raw authenticated requests for the `api` command.
//!
//! Field parsing follows two modes: `-f key=value` always sends a string,
//! `-F key=value` converts `true`, `false`, `null` and integers to JSON
//! values and reads `@file` (or `@-` for stdin) as the value.

use std::io::Read;

use ghcs_utils::error::ApiError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::client::ApiClient;

static JSON_CONTENT_TYPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[/+]json(;|$)").expect("valid regex"));

/// Invalid request input given on the command line.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("field {0:?} requires a value separated by an '=' sign")]
    MissingEquals(String),

    #[error("error parsing {key:?} value: {source}")]
    ReadValue {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("header {0:?} must be in 'Name: value' form")]
    InvalidHeader(String),

    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),
}

/// Split `key=value` at the first `=`.
pub fn parse_field(field: &str) -> Result<(String, String), RequestError> {
    match field.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(RequestError::MissingEquals(field.to_string())),
    }
}

/// Convert a `-F` value to its JSON form.
pub fn magic_field_value(value: &str, stdin: &mut dyn Read) -> std::io::Result<Value> {
    if let Some(file) = value.strip_prefix('@') {
        let mut bytes = Vec::new();
        if file == "-" {
            stdin.read_to_end(&mut bytes)?;
        } else {
            bytes = std::fs::read(file)?;
        }
        return Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    }

    if let Ok(n) = value.parse::<i64>() {
        return Ok(Value::from(n));
    }

    Ok(match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        other => Value::String(other.to_string()),
    })
}

/// Collect `-f` then `-F` fields; later keys win.
pub fn parse_fields(
    raw_fields: &[String],
    magic_fields: &[String],
    stdin: &mut dyn Read,
) -> Result<Map<String, Value>, RequestError> {
    let mut params = Map::new();
    for field in raw_fields {
        let (key, value) = parse_field(field)?;
        params.insert(key, Value::String(value));
    }
    for field in magic_fields {
        let (key, raw) = parse_field(field)?;
        let value = magic_field_value(&raw, stdin).map_err(|source| RequestError::ReadValue {
            key: key.clone(),
            source,
        })?;
        params.insert(key, value);
    }
    Ok(params)
}

pub fn parse_header(header: &str) -> Result<(String, String), RequestError> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(RequestError::InvalidHeader(header.to_string())),
    }
}

/// GET unless parameters or an input body are present; an explicit method always wins.
pub fn resolve_method(
    explicit: Option<&str>,
    has_params: bool,
    has_input: bool,
) -> Result<Method, RequestError> {
    match explicit {
        Some(m) => Method::from_bytes(m.to_ascii_uppercase().as_bytes())
            .map_err(|_| RequestError::InvalidMethod(m.to_string())),
        None if has_params || has_input => Ok(Method::POST),
        None => Ok(Method::GET),
    }
}

fn query_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Append `pairs` to `url` as an encoded query string.
pub fn with_query(url: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return url.to_string();
    }
    let encoded: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", query_escape(k), query_escape(v)))
        .collect();
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{}", encoded.join("&"))
}

/// Append parameters to a path as query string, keys in sorted order.
pub fn add_query(path: &str, params: &Map<String, Value>) -> String {
    let mut entries: Vec<(&String, String)> =
        params.iter().map(|(k, v)| (k, query_value(v))).collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    with_query(path, &pairs)
}

/// GraphQL bodies keep `query` and `operationName` at the top level; every
/// other parameter becomes a variable.
pub fn graphql_body(params: &Map<String, Value>) -> Value {
    let mut top = Map::new();
    let mut variables = Map::new();
    for (key, value) in params {
        if key == "query" || key == "operationName" {
            top.insert(key.clone(), value.clone());
        } else {
            variables.insert(key.clone(), value.clone());
        }
    }
    if !variables.is_empty() {
        top.insert("variables".to_string(), Value::Object(variables));
    }
    Value::Object(top)
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorEntry {
    Object {
        #[serde(default)]
        message: String,
    },
    Text(String),
    Other(Value),
}

fn parse_error_body(body: &[u8]) -> Result<ErrorBody, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Entries that are neither objects nor strings are shown as compact JSON.
fn joined_errors(errors: &[ErrorEntry]) -> Option<String> {
    let messages: Vec<String> = errors
        .iter()
        .map(|e| match e {
            ErrorEntry::Object { message } => message.clone(),
            ErrorEntry::Text(text) => text.clone(),
            ErrorEntry::Other(value) => value.to_string(),
        })
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("\n"))
    }
}

/// Human message from a JSON error body: `message`, else joined `errors`.
pub fn error_message(body: &[u8]) -> Option<String> {
    let parsed = parse_error_body(body).ok()?;
    if !parsed.message.is_empty() {
        return Some(parsed.message);
    }
    joined_errors(&parsed.errors)
}

/// `"<message> (HTTP <status>)"`, or the GraphQL error messages joined by newlines.
///
/// `Ok(None)` when the body carries neither.
pub fn parse_error_response(body: &[u8], status: u16) -> Result<Option<String>, ApiError> {
    let parsed = parse_error_body(body)
        .map_err(|e| ApiError::Decode(format!("error response: {e}")))?;
    if !parsed.message.is_empty() {
        return Ok(Some(format!("{} (HTTP {status})", parsed.message)));
    }
    Ok(joined_errors(&parsed.errors))
}

#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    JSON_CONTENT_TYPE.is_match(content_type)
}

/// `content-type` becomes `Content-Type`.
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Request for an arbitrary endpoint.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    /// REST path relative to the API root, a full URL, or `graphql`.
    pub path: String,
    pub params: Map<String, Value>,
    pub headers: Vec<(String, String)>,
    /// Raw body; parameters then go into the query string.
    pub input: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    /// Canonical names, sorted, repeated values joined with `, `.
    pub headers: Vec<(String, String)>,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn is_json(&self) -> bool {
        is_json_content_type(&self.content_type)
    }

    /// Status line and headers as printed by `api -i`.
    #[must_use]
    pub fn format_headers(&self) -> String {
        let mut out = format!("{} {} {}\r\n", self.version, self.status, self.reason);
        for (name, value) in &self.headers {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
        out.push_str("\r\n");
        out
    }

    /// Error text worth reporting for this response, if any.
    pub fn server_error(&self, path: &str) -> Result<Option<String>, ApiError> {
        if self.status == 204 || !self.is_json() {
            return Ok(None);
        }
        if path == "graphql" || self.status >= 400 {
            return parse_error_response(&self.body, self.status);
        }
        Ok(None)
    }
}

impl ApiClient {
    /// Send one request exactly as described, returning any status.
    pub async fn raw_request(&self, request: RawRequest) -> Result<RawResponse, ApiError> {
        let is_graphql = request.path == "graphql";
        let base_url = self.resolve_url(&request.path);

        let builder = if let Some(input) = request.input {
            let url = add_query(&base_url, &request.params);
            self.authed(request.method, &url).body(input)
        } else if request.method == Method::GET || request.method == Method::HEAD {
            let url = add_query(&base_url, &request.params);
            self.authed(request.method, &url)
        } else if is_graphql {
            self.authed(request.method, &base_url)
                .json(&graphql_body(&request.params))
        } else if request.params.is_empty() {
            self.authed(request.method, &base_url)
        } else {
            self.authed(request.method, &base_url)
                .json(&Value::Object(request.params))
        };

        let builder = request
            .headers
            .iter()
            .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()));

        let response = self.http().send(builder, "api request").await?;

        let status = response.status();
        let version = format!("{:?}", response.version());
        let mut headers: Vec<(String, String)> = Vec::new();
        for name in response.headers().keys() {
            let values: Vec<&str> = response
                .headers()
                .get_all(name)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            headers.push((canonical_header_name(name.as_str()), values.join(", ")));
        }
        headers.sort_by(|a, b| a.0.cmp(&b.0));
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(format!("api request: failed to read body: {e}")))?;

        Ok(RawResponse {
            version,
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{CannedResponse, serve_once};
    use ghcs_config::{ApiConfig, Token};
    use serde_json::json;
    use std::io::Cursor;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("key=value=more").unwrap(),
            ("key".to_string(), "value=more".to_string())
        );
        assert_eq!(
            parse_field("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        let err = parse_field("novalue").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field \"novalue\" requires a value separated by an '=' sign"
        );
    }

    #[test]
    fn test_magic_field_value_conversions() {
        let mut stdin = Cursor::new(Vec::new());
        assert_eq!(magic_field_value("123", &mut stdin).unwrap(), json!(123));
        assert_eq!(magic_field_value("-7", &mut stdin).unwrap(), json!(-7));
        assert_eq!(magic_field_value("true", &mut stdin).unwrap(), json!(true));
        assert_eq!(magic_field_value("false", &mut stdin).unwrap(), json!(false));
        assert_eq!(magic_field_value("null", &mut stdin).unwrap(), Value::Null);
        assert_eq!(magic_field_value("hello", &mut stdin).unwrap(), json!("hello"));
        assert_eq!(magic_field_value("1.5", &mut stdin).unwrap(), json!("1.5"));
    }

    #[test]
    fn test_magic_field_reads_file_and_stdin() {
        let dir = std::env::temp_dir().join(format!("ghcs-field-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("body.txt");
        std::fs::write(&file, "file contents").unwrap();

        let mut stdin = Cursor::new(b"from stdin".to_vec());
        let value = magic_field_value(&format!("@{}", file.display()), &mut stdin).unwrap();
        assert_eq!(value, json!("file contents"));

        let value = magic_field_value("@-", &mut stdin).unwrap();
        assert_eq!(value, json!("from stdin"));

        assert!(magic_field_value("@/definitely/missing/file", &mut stdin).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_parse_fields_magic_overrides_raw() {
        let mut stdin = Cursor::new(Vec::new());
        let params = parse_fields(
            &["count=5".to_string(), "title=hi".to_string()],
            &["count=5".to_string()],
            &mut stdin,
        )
        .unwrap();
        assert_eq!(params["count"], json!(5));
        assert_eq!(params["title"], json!("hi"));
    }

    #[test]
    fn test_resolve_method() {
        assert_eq!(resolve_method(None, false, false).unwrap(), Method::GET);
        assert_eq!(resolve_method(None, true, false).unwrap(), Method::POST);
        assert_eq!(resolve_method(None, false, true).unwrap(), Method::POST);
        assert_eq!(
            resolve_method(Some("delete"), true, false).unwrap(),
            Method::DELETE
        );
        assert_eq!(resolve_method(Some("GET"), true, false).unwrap(), Method::GET);
    }

    #[test]
    fn test_add_query() {
        let mut params = Map::new();
        params.insert("q".to_string(), json!("a b&c"));
        params.insert("per_page".to_string(), json!(10));
        params.insert("draft".to_string(), json!(false));
        params.insert("empty".to_string(), Value::Null);

        assert_eq!(
            add_query("search/issues", &params),
            "search/issues?draft=false&empty=&per_page=10&q=a+b%26c"
        );
        assert_eq!(
            add_query("repos?x=1", &params).split_once('&').unwrap().0,
            "repos?x=1"
        );
        assert_eq!(add_query("user", &Map::new()), "user");
    }

    #[test]
    fn test_graphql_body_groups_variables() {
        let mut params = Map::new();
        params.insert("query".to_string(), json!("query { viewer { login } }"));
        params.insert("owner".to_string(), json!("octo"));
        let body = graphql_body(&params);
        assert_eq!(body["query"], json!("query { viewer { login } }"));
        assert_eq!(body["variables"]["owner"], json!("octo"));
    }

    #[test]
    fn test_parse_error_response() {
        let body = br#"{"message":"Not Found","documentation_url":"https://docs"}"#;
        assert_eq!(
            parse_error_response(body, 404).unwrap(),
            Some("Not Found (HTTP 404)".to_string())
        );

        let body = br#"{"errors":[{"message":"Field 'x' doesn't exist"},{"message":"second"}]}"#;
        assert_eq!(
            parse_error_response(body, 200).unwrap(),
            Some("Field 'x' doesn't exist\nsecond".to_string())
        );

        assert_eq!(parse_error_response(br#"{"data":{}}"#, 200).unwrap(), None);
        assert!(parse_error_response(b"not json", 500).is_err());
    }

    #[test]
    fn test_error_entries_of_any_shape_are_reported() {
        let body = br#"{"errors":["plain text",{"message":"object"},42,[1,2]]}"#;
        assert_eq!(
            error_message(body),
            Some("plain text\nobject\n42\n[1,2]".to_string())
        );
        assert_eq!(error_message(br#"{"errors":[]}"#), None);
    }

    #[test]
    fn test_json_content_type() {
        assert!(is_json_content_type("application/json"));
        assert!(is_json_content_type("application/json; charset=utf-8"));
        assert!(is_json_content_type("application/vnd.github.v3+json"));
        assert!(!is_json_content_type("text/html"));
        assert!(!is_json_content_type("application/jsonp"));
    }

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("x-github-request-id"), "X-Github-Request-Id");
    }

    #[tokio::test]
    async fn test_raw_request_reports_status_and_sorted_headers() {
        let (base, request) = serve_once(
            CannedResponse::json(404, r#"{"message":"Not Found"}"#).with_header("X-Zed", "1"),
        )
        .await;
        let config = ApiConfig {
            rest_url: base.clone(),
            graphql_url: format!("{base}/graphql"),
            regions_url: format!("{base}/locations"),
            timeout_secs: 5,
        };
        let client = ApiClient::new(&config, &Token::new("t")).unwrap();

        let mut params = Map::new();
        params.insert("per_page".to_string(), json!(1));
        let response = client
            .raw_request(RawRequest {
                method: Method::GET,
                path: "repos/octo/none".to_string(),
                params,
                headers: vec![("X-Custom".to_string(), "yes".to_string())],
                input: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(
            response.server_error("repos/octo/none").unwrap(),
            Some("Not Found (HTTP 404)".to_string())
        );
        let names: Vec<&str> = response.headers.iter().map(|(n, _)| n.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(response.format_headers().starts_with("HTTP/1.1 404 Not Found\r\n"));

        let raw = request.await.unwrap();
        assert!(raw.starts_with("GET /repos/octo/none?per_page=1 "));
        assert!(raw.to_ascii_lowercase().contains("x-custom: yes"));
    }
}
