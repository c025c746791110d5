//! Backend resources as the client sees them.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::paging::data_source::{Identified, ItemId};

/// Compact author info embedded in messages and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    pub id: String,
    pub username: String,
}

/// A short user-authored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub body: String,
    pub author: PersonSummary,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub love_count: u32,
    #[serde(default)]
    pub appreciation_count: u32,
    #[serde(default)]
    pub is_loved: bool,
    #[serde(default)]
    pub is_saved: bool,
    #[serde(default)]
    pub is_appreciated: bool,
}

impl Message {
    /// Copy with the love flag toggled and the counter kept consistent.
    #[must_use]
    pub fn with_loved(&self, loved: bool) -> Self {
        let mut next = self.clone();
        if loved != self.is_loved {
            next.is_loved = loved;
            next.love_count = if loved {
                self.love_count.saturating_add(1)
            } else {
                self.love_count.saturating_sub(1)
            };
        }
        next
    }

    #[must_use]
    pub fn with_saved(&self, saved: bool) -> Self {
        Self {
            is_saved: saved,
            ..self.clone()
        }
    }
}

impl Identified for Message {
    fn item_id(&self) -> ItemId {
        ItemId::new(&self.id)
    }
}

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    /// Appreciations this person has received.
    #[serde(default)]
    pub help_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Identified for Person {
    fn item_id(&self) -> ItemId {
        ItemId::new(&self.id)
    }
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Love,
    Appreciation,
    Reply,
    System,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserNotification {
    pub id: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub actor: Option<PersonSummary>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub seen: bool,
}

impl Identified for UserNotification {
    fn item_id(&self) -> ItemId {
        ItemId::new(&self.id)
    }
}

/// Token pair and account facts returned by sign-in, sign-up and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    #[serde(default)]
    pub token_balance: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Server reply to an appreciation: the updated message plus the sender's
/// remaining token balance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppreciationReceipt {
    pub message: Message,
    pub token_balance: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_json() -> &'static str {
        r#"{
            "id": "m1",
            "body": "you are doing great",
            "author": {"id": "p1", "username": "lumen"},
            "createdAt": "2024-03-01T12:00:00Z",
            "loveCount": 2,
            "isLoved": false
        }"#
    }

    #[test]
    fn message_parses_camel_case_with_defaults() {
        let message: Message = serde_json::from_str(message_json()).unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.author.username, "lumen");
        assert_eq!(message.love_count, 2);
        assert!(!message.is_saved);
        assert_eq!(message.appreciation_count, 0);
        assert_eq!(message.item_id(), ItemId::new("m1"));
    }

    #[test]
    fn toggling_love_keeps_counter_consistent() {
        let message: Message = serde_json::from_str(message_json()).unwrap();
        let loved = message.with_loved(true);
        assert!(loved.is_loved);
        assert_eq!(loved.love_count, 3);
        assert_eq!(loved.with_loved(true), loved);
        assert_eq!(loved.with_loved(false).love_count, 2);
    }

    #[test]
    fn unknown_notification_kind_is_tolerated() {
        let raw = r#"{"id":"n1","kind":"birthday","createdAt":"2024-03-01T12:00:00Z"}"#;
        let notification: UserNotification = serde_json::from_str(raw).unwrap();
        assert_eq!(notification.kind, NotificationKind::Unknown);
        assert!(notification.message_id.is_none());
    }
}
