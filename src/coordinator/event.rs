//! Child → parent navigation events.

use crate::api::errors::{UserFacing, ValidationReason};
use crate::api::models::{Message, Person};
use crate::paging::ItemId;

/// Why a child flow ended unsuccessfully, already mapped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowFailure {
    pub message: String,
    pub field_errors: Vec<ValidationReason>,
}

impl FlowFailure {
    pub fn from_error<E: UserFacing>(error: &E) -> Self {
        Self {
            message: error.user_message(),
            field_errors: error.field_errors().to_vec(),
        }
    }
}

/// Everything a child coordinator can report to its parent.
///
/// Terminal events end the child (`finish_child`); the same variants can be
/// sent without ending it through `emit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Appreciated(Message),
    Loved { id: ItemId, on: bool },
    Saved { id: ItemId, on: bool },
    MessageDeleted(ItemId),
    MessagePosted(Message),
    ProfileUpdated(Person),
    TokensPurchased { amount: u64, balance: u64 },
    Failed(FlowFailure),
    Cancelled,
}

impl NavigationEvent {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Appreciated(_) => "appreciated",
            Self::Loved { .. } => "loved",
            Self::Saved { .. } => "saved",
            Self::MessageDeleted(_) => "message_deleted",
            Self::MessagePosted(_) => "message_posted",
            Self::ProfileUpdated(_) => "profile_updated",
            Self::TokensPurchased { .. } => "tokens_purchased",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}
