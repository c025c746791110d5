#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde_json::{Value, json};

use nightlight::api::http::{HttpRequest, HttpResponse, Transport};
use nightlight::app::{AppRuntime, ClientContext, UnavailablePaymentQueue};
use nightlight::core::config::Config;
use nightlight::core::errors::Result;
use nightlight::purchase::PaymentQueue;
use nightlight::store::secure::{MemorySecureStore, SecureStore};

// ──────────────────── fake backend ────────────────────

/// In-memory backend keyed by `"METHOD /path"` plus `?start=<cursor>` when a
/// cursor was sent. Each route serves its queued responses in order and then
/// keeps repeating the last one. Unknown routes answer 404.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    seen: Mutex<Vec<HttpRequest>>,
    crash_once: Mutex<HashSet<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, route: &str, status: u16, body: impl Into<String>) {
        self.routes
            .lock()
            .entry(route.to_string())
            .or_default()
            .push_back(HttpResponse {
                status,
                body: body.into(),
            });
    }

    pub fn on_json(&self, route: &str, status: u16, body: &Value) {
        self.on(route, status, body.to_string());
    }

    /// Make the next request to `route` panic inside the transport.
    pub fn crash_once(&self, route: &str) {
        self.crash_once.lock().insert(route.to_string());
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().clone()
    }

    /// How many requests hit `route` (same key format as [`FakeBackend::on`]).
    pub fn hits(&self, route: &str) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|request| route_key(request) == route)
            .count()
    }
}

pub fn route_key(request: &HttpRequest) -> String {
    let start = request
        .query
        .iter()
        .find(|(key, _)| key == "start")
        .map(|(_, value)| format!("?start={value}"))
        .unwrap_or_default();
    format!("{} {}{}", request.method, request.path, start)
}

impl Transport for FakeBackend {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.seen.lock().push(request.clone());
        let key = route_key(request);
        if self.crash_once.lock().remove(&key) {
            panic!("transport crashed on {key}");
        }
        let mut routes = self.routes.lock();
        let response = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or(HttpResponse {
            status: 404,
            body: String::new(),
        }))
    }
}

// ──────────────────── fixtures ────────────────────

pub fn message(id: &str, author: &str) -> Value {
    json!({
        "id": id,
        "body": format!("kind words {id}"),
        "author": { "id": format!("u-{author}"), "username": author },
        "createdAt": "2024-03-01T12:00:00Z",
        "loveCount": 1,
        "appreciationCount": 0,
        "isLoved": false,
        "isSaved": false,
        "isAppreciated": false
    })
}

pub fn messages(prefix: &str, range: std::ops::Range<usize>) -> Vec<Value> {
    range
        .map(|n| message(&format!("{prefix}{n}"), "ember"))
        .collect()
}

pub fn person(id: &str, username: &str, help_count: u32) -> Value {
    json!({
        "id": id,
        "username": username,
        "bio": "listens well",
        "helpCount": help_count,
        "createdAt": "2023-11-05T08:30:00Z"
    })
}

pub fn page(items: Vec<Value>, start: &str, end: Option<&str>, total: u64) -> Value {
    json!({
        "metadata": { "start": start, "end": end, "total": total },
        "data": items
    })
}

pub fn session(username: &str, token_balance: u64) -> Value {
    json!({
        "accessToken": format!("access-{username}"),
        "refreshToken": format!("refresh-{username}"),
        "username": username,
        "tokenBalance": token_balance,
        "createdAt": "2024-01-01T00:00:00Z"
    })
}

pub fn validation_body(property: &str, constraint: &str, text: &str) -> Value {
    json!({
        "errors": [{ "property": property, "constraints": { constraint: text } }]
    })
}

// ──────────────────── client wiring ────────────────────

pub fn test_config(dir: &Path, page_size: usize) -> Config {
    let mut config = Config::default();
    config.paging.page_size = page_size;
    config.paths.config_file = dir.join("config.toml");
    config.paths.credentials_file = dir.join("credentials.json");
    config.paths.preferences_file = dir.join("preferences.json");
    config.paths.activity_log = dir.join("activity.jsonl");
    config.logging.enabled = false;
    config
}

/// Secure store holding a signed-in session for `username`.
pub fn signed_in_store(username: &str, token_balance: u64) -> Arc<MemorySecureStore> {
    let store = Arc::new(MemorySecureStore::default());
    store.set("access_token", "access-1").expect("seed access token");
    store.set("refresh_token", "refresh-1").expect("seed refresh token");
    store.set("username", username).expect("seed username");
    store
        .set("token_balance", &token_balance.to_string())
        .expect("seed balance");
    store
}

pub fn context(config: Config, backend: &Arc<FakeBackend>, secure: Arc<MemorySecureStore>) -> ClientContext {
    let transport: Arc<dyn Transport> = backend.clone();
    let secure: Arc<dyn SecureStore> = secure;
    ClientContext::with_parts(config, transport, secure).expect("build client context")
}

pub fn runtime(config: Config, backend: &Arc<FakeBackend>, secure: Arc<MemorySecureStore>) -> AppRuntime {
    runtime_with_payments(config, backend, secure, Box::new(UnavailablePaymentQueue))
}

pub fn runtime_with_payments(
    config: Config,
    backend: &Arc<FakeBackend>,
    secure: Arc<MemorySecureStore>,
    payments: Box<dyn PaymentQueue + Send>,
) -> AppRuntime {
    AppRuntime::new(context(config, backend, secure), payments)
}

// ──────────────────── CLI harness ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_nightlight") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "nightlight.exe"
    } else {
        "nightlight"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve nightlight binary path for integration test"),
    }
}

/// Run the CLI with every persisted path redirected into `home`.
pub fn run_cli_case(case_name: &str, home: &Path, args: &[&str]) -> CmdResult {
    let root = std::env::temp_dir().join("nightlight-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let output = Command::new(&bin_path)
        .args(args)
        .env("NIGHTLIGHT_API_BASE_URL", "http://127.0.0.1:9")
        .env("NIGHTLIGHT_API_TIMEOUT_MS", "500")
        .env("NIGHTLIGHT_CREDENTIALS_FILE", home.join("credentials.json"))
        .env("NIGHTLIGHT_PREFERENCES_FILE", home.join("preferences.json"))
        .env("NIGHTLIGHT_ACTIVITY_LOG", home.join("activity.jsonl"))
        .env("NIGHTLIGHT_LOGGING_ENABLED", "false")
        .env_remove("NIGHTLIGHT_OUTPUT_FORMAT")
        .env("RUST_BACKTRACE", "1")
        .output()
        .expect("execute nightlight command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_content = format!(
        "case={case_name}\nargs={args:?}\nstatus={:?}\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}\n",
        output.status.code()
    );
    fs::write(&log_path, log_content).expect("write test case log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
