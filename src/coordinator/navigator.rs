//! Screen routes and the navigation stack coordinators drive.

#![allow(missing_docs)]

use std::fmt;

use crate::coordinator::arena::CoordinatorId;
use crate::paging::{ItemId, ListKey};

// ──────────────────── routes ────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Onboarding,
    SignIn,
    SignUp,
    Feed,
    Saved,
    HelpfulPeople,
    Notifications,
    MessageDetail { id: ItemId },
    Appreciate { id: ItemId },
    ConfirmDelete { id: ItemId },
    Compose,
    Profile,
    Tokens,
}

/// How a screen is placed on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Push,
    Modal,
}

impl Route {
    /// Tab route showing a paginated list.
    #[must_use]
    pub const fn for_list(list: ListKey) -> Self {
        match list {
            ListKey::Feed => Self::Feed,
            ListKey::Saved => Self::Saved,
            ListKey::HelpfulPeople => Self::HelpfulPeople,
            ListKey::Notifications => Self::Notifications,
        }
    }

    #[must_use]
    pub const fn list(&self) -> Option<ListKey> {
        match self {
            Self::Feed => Some(ListKey::Feed),
            Self::Saved => Some(ListKey::Saved),
            Self::HelpfulPeople => Some(ListKey::HelpfulPeople),
            Self::Notifications => Some(ListKey::Notifications),
            _ => None,
        }
    }

    #[must_use]
    pub const fn presentation(&self) -> Presentation {
        match self {
            Self::Appreciate { .. } | Self::ConfirmDelete { .. } | Self::Compose | Self::Tokens => {
                Presentation::Modal
            }
            _ => Presentation::Push,
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Onboarding => "Welcome",
            Self::SignIn => "Sign in",
            Self::SignUp => "Sign up",
            Self::Feed => "Feed",
            Self::Saved => "Saved",
            Self::HelpfulPeople => "Helpful people",
            Self::Notifications => "Notifications",
            Self::MessageDetail { .. } => "Message",
            Self::Appreciate { .. } => "Appreciate",
            Self::ConfirmDelete { .. } => "Delete message",
            Self::Compose => "New message",
            Self::Profile => "Profile",
            Self::Tokens => "Tokens",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageDetail { id } | Self::Appreciate { id } | Self::ConfirmDelete { id } => {
                write!(f, "{} ({id})", self.title())
            }
            _ => f.write_str(self.title()),
        }
    }
}

// ──────────────────── navigator ────────────────────

/// Whatever actually shows screens. Coordinators only push or present once
/// on start and dismiss once on finish.
pub trait Navigator {
    fn show(&mut self, owner: CoordinatorId, route: Route, presentation: Presentation);

    /// Remove every screen `owner` put up. Returns how many were removed.
    fn dismiss(&mut self, owner: CoordinatorId) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    pub owner: CoordinatorId,
    pub route: Route,
    pub presentation: Presentation,
}

/// Recording navigator: an ordered stack of visible screens.
#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    entries: Vec<StackEntry>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn routes(&self) -> Vec<&Route> {
        self.entries.iter().map(|entry| &entry.route).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, route: &Route) -> bool {
        self.entries.iter().any(|entry| &entry.route == route)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Navigator for NavigationStack {
    fn show(&mut self, owner: CoordinatorId, route: Route, presentation: Presentation) {
        self.entries.push(StackEntry {
            owner,
            route,
            presentation,
        });
    }

    fn dismiss(&mut self, owner: CoordinatorId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.owner != owner);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::arena::CoordinatorArena;

    #[test]
    fn modal_routes_are_presented() {
        assert_eq!(Route::Compose.presentation(), Presentation::Modal);
        assert_eq!(
            Route::Appreciate { id: ItemId::new("m1") }.presentation(),
            Presentation::Modal
        );
        assert_eq!(Route::Feed.presentation(), Presentation::Push);
    }

    #[test]
    fn dismiss_removes_only_owner_screens() {
        let mut arena = CoordinatorArena::new();
        let a = arena.create_root(Route::Feed);
        let b = arena.create_root(Route::Saved);
        let mut stack = NavigationStack::new();
        stack.show(a, Route::Feed, Presentation::Push);
        stack.show(b, Route::Saved, Presentation::Push);
        assert_eq!(stack.dismiss(a), 1);
        assert_eq!(stack.routes(), vec![&Route::Saved]);
        assert_eq!(stack.dismiss(a), 0);
    }

    #[test]
    fn list_routes_round_trip() {
        for list in ListKey::ALL {
            assert_eq!(Route::for_list(list).list(), Some(list));
        }
        assert_eq!(Route::Compose.list(), None);
    }

    #[test]
    fn display_includes_item() {
        let route = Route::MessageDetail { id: ItemId::new("m7") };
        assert_eq!(route.to_string(), "Message (m7)");
    }
}
