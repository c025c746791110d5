//! Domain error taxonomy returned by the service layer.
//!
//! Services translate transport and HTTP-status failures into one of these
//! enums. Only server-side field validation is kept structured; every other
//! failure collapses to an opaque `Unknown`, so the UI cannot (and does not)
//! distinguish an unreachable network from a 5xx or a malformed body.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::core::errors::NightlightError;

/// Generic copy for every non-validation failure.
pub const CONNECTION_FAILED_MESSAGE: &str = "Could not connect. Please try again.";

/// One server-side validation failure: the offending property and the
/// constraints it violated (constraint name → human text).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationReason {
    pub property: String,
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
}

impl ValidationReason {
    pub fn new(property: impl Into<String>, constraint: &str, text: &str) -> Self {
        let mut constraints = BTreeMap::new();
        constraints.insert(constraint.to_string(), text.to_string());
        Self {
            property: property.into(),
            constraints,
        }
    }

    /// Field-level message shown next to the offending input.
    pub fn message(&self) -> String {
        if self.constraints.is_empty() {
            return format!("{} is invalid", self.property);
        }
        self.constraints
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Deserialize)]
struct ValidationBody {
    errors: Vec<ValidationReason>,
}

/// Extract validation reasons from a 400/422 response body.
pub fn parse_validation(status: u16, body: &str) -> Option<Vec<ValidationReason>> {
    if status != 400 && status != 422 {
        return None;
    }
    serde_json::from_str::<ValidationBody>(body)
        .ok()
        .map(|parsed| parsed.errors)
        .filter(|errors| !errors.is_empty())
}

fn validation_from(err: &NightlightError) -> Option<Vec<ValidationReason>> {
    match err {
        NightlightError::HttpStatus { status, body } => parse_validation(*status, body),
        _ => None,
    }
}

fn summarize(reasons: &[ValidationReason]) -> String {
    reasons
        .iter()
        .map(|reason| format!("{}: {}", reason.property, reason.message()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// How the UI presents a failure.
pub trait UserFacing {
    /// Validation reasons to map onto form fields; empty for other failures.
    fn field_errors(&self) -> &[ValidationReason];

    /// Toast copy for the failure.
    fn user_message(&self) -> String {
        let fields = self.field_errors();
        if fields.is_empty() {
            CONNECTION_FAILED_MESSAGE.to_string()
        } else {
            fields
                .iter()
                .map(ValidationReason::message)
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Sign-in, sign-up, refresh and password-reset failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationReason>),
    #[error("password reset token is invalid or expired")]
    InvalidResetToken,
    #[error("authentication failed")]
    Unknown,
}

impl From<NightlightError> for AuthError {
    fn from(err: NightlightError) -> Self {
        validation_from(&err).map_or(Self::Unknown, Self::Validation)
    }
}

impl UserFacing for AuthError {
    fn field_errors(&self) -> &[ValidationReason] {
        match self {
            Self::Validation(reasons) => reasons,
            _ => &[],
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::InvalidResetToken => {
                "This reset link has expired. Request a new one.".to_string()
            }
            Self::Validation(reasons) => reasons
                .iter()
                .map(ValidationReason::message)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Unknown => CONNECTION_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Message feed, posting and reaction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationReason>),
    #[error("message not found")]
    NotFound,
    #[error("not enough tokens")]
    InsufficientTokens,
    #[error("message request failed")]
    Unknown,
}

impl From<NightlightError> for MessageError {
    fn from(err: NightlightError) -> Self {
        if let Some(reasons) = validation_from(&err) {
            return Self::Validation(reasons);
        }
        match err.http_status() {
            Some(404) => Self::NotFound,
            Some(402) => Self::InsufficientTokens,
            _ => Self::Unknown,
        }
    }
}

impl UserFacing for MessageError {
    fn field_errors(&self) -> &[ValidationReason] {
        match self {
            Self::Validation(reasons) => reasons,
            _ => &[],
        }
    }

    fn user_message(&self) -> String {
        match self {
            Self::NotFound => "That message is no longer available.".to_string(),
            Self::InsufficientTokens => "You need more tokens to appreciate this.".to_string(),
            Self::Validation(reasons) => summarize(reasons),
            Self::Unknown => CONNECTION_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Profile and people-list failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersonError {
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<ValidationReason>),
    #[error("people request failed")]
    Unknown,
}

impl From<NightlightError> for PersonError {
    fn from(err: NightlightError) -> Self {
        validation_from(&err).map_or(Self::Unknown, Self::Validation)
    }
}

impl UserFacing for PersonError {
    fn field_errors(&self) -> &[ValidationReason] {
        match self {
            Self::Validation(reasons) => reasons,
            Self::Unknown => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNotificationError {
    #[error("notification request failed")]
    Unknown,
}

impl From<NightlightError> for UserNotificationError {
    fn from(_: NightlightError) -> Self {
        Self::Unknown
    }
}

impl UserFacing for UserNotificationError {
    fn field_errors(&self) -> &[ValidationReason] {
        &[]
    }
}
