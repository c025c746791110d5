//! NL-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, NightlightError>;

/// Infrastructure error type for the Nightlight client core.
///
/// Domain failures reported by the backend (validation, invalid reset token,
/// ...) live in [`crate::api::errors`]; this enum covers everything below
/// them: configuration, transport, persistence and runtime plumbing.
#[derive(Debug, Error)]
pub enum NightlightError {
    #[error("[NL-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[NL-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[NL-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[NL-2001] transport failure: {details}")]
    Transport { details: String },

    #[error("[NL-2002] unexpected HTTP status {status}")]
    HttpStatus { status: u16, body: String },

    #[error("[NL-2003] not signed in")]
    NotAuthenticated,

    #[error("[NL-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[NL-3001] secure store failure: {details}")]
    SecureStore { details: String },

    #[error("[NL-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[NL-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[NL-3101] navigation failure: {details}")]
    Navigation { details: String },

    #[error("[NL-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl NightlightError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "NL-1001",
            Self::MissingConfig { .. } => "NL-1002",
            Self::ConfigParse { .. } => "NL-1003",
            Self::Transport { .. } => "NL-2001",
            Self::HttpStatus { .. } => "NL-2002",
            Self::NotAuthenticated => "NL-2003",
            Self::Serialization { .. } => "NL-2101",
            Self::SecureStore { .. } => "NL-3001",
            Self::Io { .. } => "NL-3002",
            Self::ChannelClosed { .. } => "NL-3003",
            Self::Navigation { .. } => "NL-3101",
            Self::Runtime { .. } => "NL-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// Nothing in the crate retries automatically; this only feeds the
    /// decision of whether to offer the user a retry affordance.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Io { .. } | Self::ChannelClosed { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<serde_json::Error> for NightlightError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for NightlightError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for NightlightError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            details: value.to_string(),
        }
    }
}
