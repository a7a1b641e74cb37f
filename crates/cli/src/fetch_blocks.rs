//! `modlist fetch-blocks`: page through the accounts an X user blocks and
//! write them as a CSV that `modlist augment` can ingest.
//!
//! Pagination is strictly sequential: cursor `-1` first, then each
//! response's `next_cursor` until it is `0`. A 429 waits and retries the
//! same cursor; every successful page is followed by a short pause.

use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Args;
use serde::Deserialize;
use tracing::{info, warn};

use crate::exit_codes::{
    EXIT_FETCH_AUTH, EXIT_FETCH_NOT_AUTH, EXIT_FETCH_RATE_LIMIT, EXIT_FETCH_UPSTREAM, EXIT_FETCH_VALIDATION,
};
use crate::CliError;

pub const X_API_BASE: &str = "https://api.x.com";
const BLOCKS_PATH: &str = "/1.1/blocks/list.json";
const START_CURSOR: i64 = -1;
const USER_AGENT: &str = concat!("modlist/", env!("CARGO_PKG_VERSION"));

pub const ENV_BEARER_TOKEN: &str = "X_BEARER_TOKEN";
pub const ENV_CSRF_TOKEN: &str = "X_CSRF_TOKEN";
pub const ENV_AUTH_TOKEN: &str = "X_AUTH_TOKEN";

const CSV_HEADER: [&str; 2] = ["Twitter", "Categories"];

#[derive(Args)]
pub struct FetchBlocksArgs {
    /// Output CSV file
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Category every exported account is tagged with
    #[arg(long, default_value = "blocked")]
    pub category: String,

    /// API base URL
    #[arg(long, default_value = X_API_BASE, hide = true)]
    pub api_base: String,
}

pub fn cmd_fetch_blocks(args: FetchBlocksArgs) -> Result<(), CliError> {
    let category = args.category.trim();
    if category.is_empty() || category.contains(',') {
        return Err(CliError::args("--category must be a single non-empty tag"));
    }

    let credentials = Credentials::from_env()?;
    let client = BlocksClient::new(credentials, &args.api_base, Pacing::default())?;
    let handles = client.fetch_all()?;

    write_csv(&args.output, &handles, category)?;
    println!("{} blocked accounts → {}", handles.len(), args.output.display());
    Ok(())
}

// ── Credentials ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Credentials {
    pub bearer_token: String,
    pub csrf_token: String,
    pub auth_token: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CliError> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| {
            let value = lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };
        let credentials = Self {
            bearer_token: read(ENV_BEARER_TOKEN),
            csrf_token: read(ENV_CSRF_TOKEN),
            auth_token: read(ENV_AUTH_TOKEN),
        };

        if !missing.is_empty() {
            return Err(CliError {
                code: EXIT_FETCH_NOT_AUTH,
                message: format!("missing X credentials: {}", missing.join(", ")),
                hint: Some("copy them from a logged-in browser session (authorization header, ct0 and auth_token cookies)".into()),
            });
        }
        Ok(credentials)
    }

    fn authorization(&self) -> String {
        if self.bearer_token.starts_with("Bearer ") {
            self.bearer_token.clone()
        } else {
            format!("Bearer {}", self.bearer_token)
        }
    }

    fn cookie(&self) -> String {
        format!("ct0={}; auth_token={}", self.csrf_token, self.auth_token)
    }
}

// ── Client ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    /// Pause after every successful page
    pub page_delay: Duration,
    /// Wait after a 429 before retrying the same cursor
    pub rate_limit_wait: Duration,
    /// 429 responses tolerated in a row before giving up
    pub max_rate_limit_waits: u32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(1),
            rate_limit_wait: Duration::from_secs(15),
            max_rate_limit_waits: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BlocksPage {
    #[serde(default)]
    users: Vec<BlockedUser>,
    #[serde(default)]
    next_cursor: i64,
}

#[derive(Debug, Deserialize)]
struct BlockedUser {
    screen_name: String,
}

pub struct BlocksClient {
    http: reqwest::blocking::Client,
    base_url: String,
    credentials: Credentials,
    pacing: Pacing,
}

impl BlocksClient {
    pub fn new(credentials: Credentials, base_url: &str, pacing: Pacing) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| upstream(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            pacing,
        })
    }

    /// Every blocked handle, in the order the API returns them, without repeats.
    pub fn fetch_all(&self) -> Result<Vec<String>, CliError> {
        let mut handles = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = START_CURSOR;
        let mut page_no = 0u32;

        loop {
            page_no += 1;
            let page = self.fetch_page(cursor)?;
            let received = page.users.len();
            for user in page.users {
                if seen.insert(user.screen_name.to_lowercase()) {
                    handles.push(user.screen_name);
                }
            }
            info!(page = page_no, received, next_cursor = page.next_cursor, "fetched blocks page");

            if page.next_cursor == 0 {
                break;
            }
            cursor = page.next_cursor;
            thread::sleep(self.pacing.page_delay);
        }

        Ok(handles)
    }

    fn fetch_page(&self, cursor: i64) -> Result<BlocksPage, CliError> {
        let url = format!("{}{}", self.base_url, BLOCKS_PATH);
        let mut waits = 0u32;

        loop {
            let response = self.http.get(&url)
                .query(&[("cursor", cursor.to_string())])
                .header("authorization", self.credentials.authorization())
                .header("cookie", self.credentials.cookie())
                .header("x-csrf-token", &self.credentials.csrf_token)
                .send()
                .map_err(|e| upstream(format!("X request failed: {}", e)))?;

            let status = response.status().as_u16();
            match status {
                200..=299 => {
                    let text = response.text().map_err(|e| upstream(format!("failed to read X response: {}", e)))?;
                    return serde_json::from_str(&text).map_err(|e| {
                        upstream(format!(
                            "failed to parse X response: {} (body: {})",
                            e,
                            text.chars().take(200).collect::<String>()
                        ))
                    });
                }
                429 => {
                    if waits == self.pacing.max_rate_limit_waits {
                        return Err(CliError {
                            code: EXIT_FETCH_RATE_LIMIT,
                            message: format!("X rate limited after {} waits (cursor {})", waits, cursor),
                            hint: Some("try again later; fetching restarts from the first page".into()),
                        });
                    }
                    waits += 1;
                    warn!(
                        cursor,
                        wait_secs = self.pacing.rate_limit_wait.as_secs(),
                        attempt = waits,
                        "rate limited, waiting"
                    );
                    thread::sleep(self.pacing.rate_limit_wait);
                }
                401 | 403 => {
                    return Err(CliError {
                        code: EXIT_FETCH_AUTH,
                        message: format!("X auth failed ({})", status),
                        hint: Some(format!("refresh {}, {} and {}", ENV_BEARER_TOKEN, ENV_CSRF_TOKEN, ENV_AUTH_TOKEN)),
                    });
                }
                400..=499 => {
                    let body = response.text().unwrap_or_default();
                    return Err(CliError {
                        code: EXIT_FETCH_VALIDATION,
                        message: format!("X request rejected ({}): {}", status, body.trim()),
                        hint: None,
                    });
                }
                _ => return Err(upstream(format!("X upstream error ({})", status))),
            }
        }
    }
}

fn upstream(message: String) -> CliError {
    CliError { code: EXIT_FETCH_UPSTREAM, message, hint: None }
}

// ── Output ──────────────────────────────────────────────────────────

fn write_csv(path: &std::path::Path, handles: &[String], category: &str) -> Result<(), CliError> {
    let io_err = |e: csv::Error| CliError::io(format!("{}: {}", path.display(), e));
    let mut writer = csv::Writer::from_path(path).map_err(io_err)?;
    writer.write_record(CSV_HEADER).map_err(io_err)?;
    for handle in handles {
        writer.write_record([handle.as_str(), category]).map_err(io_err)?;
    }
    writer.flush().map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            bearer_token: "tok".into(),
            csrf_token: "csrf".into(),
            auth_token: "auth".into(),
        }
    }

    fn fast() -> Pacing {
        Pacing {
            page_delay: Duration::ZERO,
            rate_limit_wait: Duration::ZERO,
            max_rate_limit_waits: 2,
        }
    }

    #[test]
    fn test_pagination_until_zero_cursor() {
        let server = MockServer::start();

        let page1 = server.mock(|when, then| {
            when.method(GET)
                .path(BLOCKS_PATH)
                .query_param("cursor", "-1")
                .header("authorization", "Bearer tok")
                .header("cookie", "ct0=csrf; auth_token=auth")
                .header("x-csrf-token", "csrf");
            then.status(200).json_body(json!({
                "users": [{"screen_name": "alpha"}, {"screen_name": "beta"}],
                "next_cursor": 1681
            }));
        });
        let page2 = server.mock(|when, then| {
            when.method(GET).path(BLOCKS_PATH).query_param("cursor", "1681");
            then.status(200).json_body(json!({
                "users": [{"screen_name": "Beta"}, {"screen_name": "gamma"}],
                "next_cursor": 0
            }));
        });

        let client = BlocksClient::new(credentials(), &server.base_url(), fast()).unwrap();
        let handles = client.fetch_all().unwrap();

        page1.assert();
        page2.assert();
        assert_eq!(handles, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_missing_next_cursor_stops() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET).path(BLOCKS_PATH);
            then.status(200).json_body(json!({"users": [{"screen_name": "solo"}]}));
        });

        let client = BlocksClient::new(credentials(), &server.base_url(), fast()).unwrap();
        assert_eq!(client.fetch_all().unwrap(), ["solo"]);
        page.assert_hits(1);
    }

    #[test]
    fn test_rate_limit_retries_same_cursor_then_gives_up() {
        let server = MockServer::start();
        let limited = server.mock(|when, then| {
            when.method(GET).path(BLOCKS_PATH).query_param("cursor", "-1");
            then.status(429).body("Rate limit exceeded");
        });

        let client = BlocksClient::new(credentials(), &server.base_url(), fast()).unwrap();
        let err = client.fetch_all().unwrap_err();

        assert_eq!(err.code, EXIT_FETCH_RATE_LIMIT);
        // first attempt plus one retry per allowed wait
        limited.assert_hits(3);
    }

    #[test]
    fn test_auth_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(BLOCKS_PATH);
            then.status(401).json_body(json!({"errors": [{"code": 32}]}));
        });

        let client = BlocksClient::new(credentials(), &server.base_url(), fast()).unwrap();
        assert_eq!(client.fetch_all().unwrap_err().code, EXIT_FETCH_AUTH);
    }

    #[test]
    fn test_server_error_and_bad_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(BLOCKS_PATH);
            then.status(503);
        });
        let client = BlocksClient::new(credentials(), &server.base_url(), fast()).unwrap();
        assert_eq!(client.fetch_all().unwrap_err().code, EXIT_FETCH_UPSTREAM);

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(BLOCKS_PATH);
            then.status(200).body("<html>");
        });
        let client = BlocksClient::new(credentials(), &server.base_url(), fast()).unwrap();
        assert_eq!(client.fetch_all().unwrap_err().code, EXIT_FETCH_UPSTREAM);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let err = Credentials::from_lookup(|name| (name == ENV_BEARER_TOKEN).then(|| "tok".to_string())).unwrap_err();
        assert_eq!(err.code, EXIT_FETCH_NOT_AUTH);
        assert!(err.message.contains(ENV_CSRF_TOKEN));
        assert!(err.message.contains(ENV_AUTH_TOKEN));
        assert!(!err.message.contains(ENV_BEARER_TOKEN));

        let creds = Credentials::from_lookup(|name| Some(format!(" {} ", name.to_lowercase()))).unwrap();
        assert_eq!(creds.csrf_token, "x_csrf_token");
        assert_eq!(creds.authorization(), "Bearer x_bearer_token");

        let prefixed = Credentials { bearer_token: "Bearer abc".into(), ..credentials() };
        assert_eq!(prefixed.authorization(), "Bearer abc");
    }

    #[test]
    fn test_csv_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blocks.csv");
        write_csv(&path, &["alpha".to_string(), "beta".to_string()], "harassment").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Twitter,Categories\nalpha,harassment\nbeta,harassment\n");
    }
}
