//! Client-side form checks, run before anything is sent.
//!
//! Failures use the same [`ValidationReason`] shape the server returns, so
//! forms render local and remote field errors identically.

use std::sync::OnceLock;

use regex::Regex;

use crate::api::errors::ValidationReason;
use crate::api::models::SignUpRequest;

pub const MIN_PASSWORD_LEN: usize = 8;

fn username_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,30}$").ok())
        .as_ref()
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

fn is_match(pattern: Option<&Regex>, value: &str) -> bool {
    pattern.is_some_and(|re| re.is_match(value))
}

pub fn required(field: &str) -> ValidationReason {
    ValidationReason::new(field, "isNotEmpty", &format!("{field} is required"))
}

/// Empty when the request may be sent.
pub fn check_sign_up(request: &SignUpRequest) -> Vec<ValidationReason> {
    let mut reasons = Vec::new();
    if !is_match(username_pattern(), &request.username) {
        reasons.push(ValidationReason::new(
            "username",
            "matches",
            "username must be 3-30 letters, digits or underscores",
        ));
    }
    if !is_match(email_pattern(), &request.email) {
        reasons.push(ValidationReason::new(
            "email",
            "isEmail",
            "email must be an email",
        ));
    }
    reasons.extend(check_password(&request.password));
    reasons
}

/// Password rule shared by sign-up and password reset.
pub fn check_password(password: &str) -> Option<ValidationReason> {
    (password.chars().count() < MIN_PASSWORD_LEN).then(|| {
        ValidationReason::new(
            "password",
            "minLength",
            &format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        )
    })
}

/// Empty when a post body may be sent.
pub fn check_post(body: &str) -> Vec<ValidationReason> {
    if body.trim().is_empty() {
        vec![ValidationReason::new(
            "body",
            "isNotEmpty",
            "message cannot be empty",
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> SignUpRequest {
        SignUpRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn well_formed_sign_up_passes() {
        assert!(check_sign_up(&request("lumen_7", "lumen@example.com", "hunter22")).is_empty());
    }

    #[test]
    fn each_bad_field_is_reported() {
        let reasons = check_sign_up(&request("x", "not-an-email", "short"));
        let fields: Vec<&str> = reasons.iter().map(|r| r.property.as_str()).collect();
        assert_eq!(fields, vec!["username", "email", "password"]);
    }

    #[test]
    fn username_rejects_spaces() {
        let reasons = check_sign_up(&request("lu men", "a@b.co", "longenough"));
        assert_eq!(reasons.len(), 1);
        assert_eq!(reasons[0].property, "username");
    }

    #[test]
    fn blank_post_is_rejected() {
        assert_eq!(check_post("  \n").len(), 1);
        assert!(check_post("hi").is_empty());
    }

    #[test]
    fn password_rule_counts_characters() {
        assert!(check_password("ünïcödé").is_some());
        assert!(check_password("ünïcödé!").is_none());
        let reason = check_password("short").unwrap();
        assert_eq!(reason.property, "password");
    }
}
