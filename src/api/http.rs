//! HTTP plumbing: a swappable [`Transport`] and the authorized [`ApiClient`].
//!
//! All calls are blocking; they run on worker threads spawned by the runtime
//! and never on the main queue.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::models::AuthSession;
use crate::core::config::ApiConfig;
use crate::core::errors::{NightlightError, Result};
use crate::store::credentials::CredentialStore;

/// HTTP verbs used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A transport-agnostic request. `path` is relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    #[must_use]
    pub fn query<K: Into<String>>(mut self, pairs: impl IntoIterator<Item = (K, String)>) -> Self {
        self.query
            .extend(pairs.into_iter().map(|(key, value)| (key.into(), value)));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Raw response: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body, treating an empty body as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(NightlightError::HttpStatus {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Anything that can execute an [`HttpRequest`].
///
/// Non-2xx statuses are *not* errors at this layer; only failures to get a
/// response at all are.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Production transport over `reqwest`'s blocking client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url).query(&request.query);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// Backend client that injects the bearer token and refreshes it once on 401.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<CredentialStore>,
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Send without authorization (sign-in, sign-up, reset).
    pub fn send_public(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.transport.execute(&request)?.into_result()
    }

    /// Send with the stored access token.
    ///
    /// A 401 triggers one refresh-token exchange and a single replay; a second
    /// 401 is returned to the caller as-is.
    pub fn send_authorized(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        let token = self
            .credentials
            .access_token()?
            .ok_or(NightlightError::NotAuthenticated)?;
        request.bearer = Some(token.clone());

        let response = self.transport.execute(&request)?;
        if response.status != 401 {
            return response.into_result();
        }

        let refreshed = self.refresh_access_token(&token)?;
        request.bearer = Some(refreshed);
        self.transport.execute(&request)?.into_result()
    }

    pub fn get_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        self.send_authorized(request)?.json()
    }

    fn refresh_access_token(&self, stale: &str) -> Result<String> {
        let _guard = self.refresh_lock.lock();

        // Another worker may have refreshed while we waited.
        if let Some(current) = self.credentials.access_token()?
            && current != stale
        {
            return Ok(current);
        }

        let refresh_token = self
            .credentials
            .refresh_token()?
            .ok_or(NightlightError::NotAuthenticated)?;
        let request = HttpRequest::new(Method::Post, "/auth/refresh")
            .json(&serde_json::json!({ "refreshToken": refresh_token }))?;

        let response = self.transport.execute(&request)?;
        if response.status == 401 {
            self.credentials.clear()?;
            return Err(NightlightError::NotAuthenticated);
        }
        let session: AuthSession = response.into_result()?.json()?;
        self.credentials.store_session(&session)?;
        Ok(session.access_token)
    }
}
