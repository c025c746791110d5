//! Cursor pagination shared by every list screen.

pub mod data_source;
pub mod pager;
pub mod view_model;

pub use data_source::{EmptyState, EmptyStates, Identified, ItemId, ListDataSource};
pub use pager::CursorPager;
pub use view_model::{FetchOutcome, FetchState, FetchTicket, PageSource, PaginatedViewModel};

/// The paginated lists the app keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKey {
    Feed,
    Saved,
    HelpfulPeople,
    Notifications,
}

impl ListKey {
    pub const ALL: [Self; 4] = [
        Self::Feed,
        Self::Saved,
        Self::HelpfulPeople,
        Self::Notifications,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Saved => "saved",
            Self::HelpfulPeople => "helpful_people",
            Self::Notifications => "notifications",
        }
    }
}
