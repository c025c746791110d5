//! Push payload parsing.
//!
//! A notification's `userInfo` names the message it is about in `entityId`,
//! either at the top level or inside a `data` object. The id may arrive as a
//! string or as a number.

use serde_json::Value;

use crate::paging::ItemId;

/// Where tapping a notification should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLink {
    MessageDetail(ItemId),
}

pub fn parse_user_info(user_info: &Value) -> Option<DeepLink> {
    let entity = user_info
        .get("entityId")
        .or_else(|| user_info.get("data").and_then(|data| data.get("entityId")))?;

    let id = match entity {
        Value::String(raw) => raw.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }
    Some(DeepLink::MessageDetail(ItemId::new(id)))
}

/// Parse a raw JSON payload string.
pub fn parse_payload(raw: &str) -> Option<DeepLink> {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|value| parse_user_info(&value))
}
