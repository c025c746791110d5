//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{NightlightError, Result};
use crate::core::paths::{config_root, data_root, expand_tilde};

/// Upper bound the backend accepts for `limit`.
pub const MAX_PAGE_SIZE: usize = 100;

/// Full client configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub paging: PagingConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

/// Backend endpoint and transport knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto (no trailing slash).
    pub base_url: String,
    /// Per-request timeout handed to the transport.
    pub timeout_ms: u64,
    pub user_agent: String,
}

/// List paging behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PagingConfig {
    /// Items requested per page (`limit` query parameter).
    pub page_size: usize,
}

/// Filesystem paths used by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub credentials_file: PathBuf,
    pub preferences_file: PathBuf,
    pub activity_log: PathBuf,
}

/// Activity log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.nightlight.example/v1".to_string(),
            timeout_ms: 15_000,
            user_agent: format!("nightlight/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data = data_root();
        Self {
            config_file: config_root().join("config.toml"),
            credentials_file: data.join("credentials.json"),
            preferences_file: config_root().join("preferences.json"),
            activity_log: data.join("activity.jsonl"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size_bytes: 10 * 1024 * 1024,
            max_rotated_files: 3,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf)
                .map_err(|source| NightlightError::io(&path_buf, source))?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(NightlightError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for the activity log.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Render the effective config as TOML (used by `config show`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|error| NightlightError::Serialization {
            context: "toml",
            details: error.to_string(),
        })
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("NIGHTLIGHT_API_BASE_URL") {
            self.api.base_url = raw;
        }
        if let Some(raw) = lookup("NIGHTLIGHT_API_TIMEOUT_MS") {
            self.api.timeout_ms = parse_env("NIGHTLIGHT_API_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("NIGHTLIGHT_API_USER_AGENT") {
            self.api.user_agent = raw;
        }
        if let Some(raw) = lookup("NIGHTLIGHT_PAGE_SIZE") {
            self.paging.page_size = parse_env("NIGHTLIGHT_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("NIGHTLIGHT_CREDENTIALS_FILE") {
            self.paths.credentials_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("NIGHTLIGHT_PREFERENCES_FILE") {
            self.paths.preferences_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("NIGHTLIGHT_ACTIVITY_LOG") {
            self.paths.activity_log = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("NIGHTLIGHT_LOGGING_ENABLED") {
            self.logging.enabled = parse_env("NIGHTLIGHT_LOGGING_ENABLED", &raw)?;
        }
        Ok(())
    }

    fn normalize(&mut self) {
        while self.api.base_url.ends_with('/') {
            self.api.base_url.pop();
        }
        self.paths.credentials_file = expand_tilde(&self.paths.credentials_file);
        self.paths.preferences_file = expand_tilde(&self.paths.preferences_file);
        self.paths.activity_log = expand_tilde(&self.paths.activity_log);
    }

    fn validate(&self) -> Result<()> {
        if !(self.api.base_url.starts_with("https://") || self.api.base_url.starts_with("http://"))
        {
            return Err(NightlightError::InvalidConfig {
                details: format!(
                    "api.base_url must be an http(s) URL, got {:?}",
                    self.api.base_url
                ),
            });
        }

        if self.api.timeout_ms == 0 {
            return Err(NightlightError::InvalidConfig {
                details: "api.timeout_ms must be > 0".to_string(),
            });
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.paging.page_size) {
            return Err(NightlightError::InvalidConfig {
                details: format!(
                    "paging.page_size must be in [1, {MAX_PAGE_SIZE}], got {}",
                    self.paging.page_size
                ),
            });
        }

        if self.logging.enabled && self.logging.max_size_bytes == 0 {
            return Err(NightlightError::InvalidConfig {
                details: "logging.max_size_bytes must be > 0 when logging is enabled".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|error| NightlightError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })
}
