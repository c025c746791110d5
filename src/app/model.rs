//! Elm-style application state.
//!
//! All presentation state lives in [`AppModel`]. User input and worker
//! results arrive as [`AppMsg`] values; side-effects leave as [`AppCmd`]
//! values for the runtime. Nothing in this module performs I/O.

use std::collections::HashMap;

use crate::api::errors::{
    AuthError, MessageError, PersonError, UserNotificationError, ValidationReason,
};
use crate::api::models::{
    AppreciationReceipt, AuthSession, Message, Person, ProfileUpdate, SignUpRequest,
    UserNotification,
};
use crate::api::page::Page;
use crate::coordinator::{CoordinatorArena, CoordinatorId, NavigationStack, Route};
use crate::logger::activity::ActivityEvent;
use crate::paging::{
    EmptyState, EmptyStates, FetchState, FetchTicket, ItemId, ListKey, PaginatedViewModel,
};
use crate::purchase::PurchaseOutcome;
use crate::push::DeepLink;
use crate::store::preferences::Theme;

// ──────────────────── toasts ────────────────────

/// Maximum number of visible toasts; the oldest is evicted first.
pub const MAX_TOASTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

// ──────────────────── session ────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    SignedOut,
    SignedIn {
        username: String,
        token_balance: u64,
    },
}

// ──────────────────── row targets ────────────────────

/// What a row action applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A row of a message list.
    Row { list: ListKey, index: usize },
    /// The message shown by the topmost detail screen.
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Love,
    Save,
}

impl Reaction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Love => "love",
            Self::Save => "save",
        }
    }
}

// ──────────────────── page results ────────────────────

/// A worker's page result, tagged by item type.
#[derive(Debug)]
pub enum PageResult {
    Messages(Result<Page<Message>, MessageError>),
    People(Result<Page<Person>, PersonError>),
    Notifications(Result<Page<UserNotification>, UserNotificationError>),
}

impl PageResult {
    /// Result for a fetch whose worker never produced one.
    pub fn lost(list: ListKey) -> Self {
        match list {
            ListKey::Feed | ListKey::Saved => Self::Messages(Err(MessageError::Unknown)),
            ListKey::HelpfulPeople => Self::People(Err(PersonError::Unknown)),
            ListKey::Notifications => Self::Notifications(Err(UserNotificationError::Unknown)),
        }
    }
}

// ──────────────────── messages ────────────────────

#[derive(Debug)]
pub enum AppMsg {
    /// Boot: what the credential store and preferences said.
    Started {
        username: Option<String>,
        token_balance: u64,
        has_onboarded: bool,
    },
    CompleteOnboarding,
    ShowSignUp,
    SignIn {
        username: String,
        password: String,
    },
    SignUp(SignUpRequest),
    AuthDone(Result<AuthSession, AuthError>),
    SignOut,

    SelectTab(ListKey),
    Refresh(ListKey),
    Scrolled {
        list: ListKey,
        visible_index: usize,
    },
    PageLoaded {
        list: ListKey,
        ticket: FetchTicket,
        result: PageResult,
        duration_ms: u64,
    },

    OpenMessage {
        list: ListKey,
        index: usize,
    },
    PushOpened(DeepLink),
    MessageLoaded {
        coordinator: CoordinatorId,
        result: Result<Message, MessageError>,
    },
    React {
        target: Target,
        reaction: Reaction,
    },
    ReactionDone {
        origin: Option<CoordinatorId>,
        id: ItemId,
        reaction: Reaction,
        on: bool,
        result: Result<(), MessageError>,
    },
    StartAppreciate(Target),
    ConfirmAppreciate,
    AppreciateDone {
        coordinator: CoordinatorId,
        result: Result<AppreciationReceipt, MessageError>,
    },
    RequestDelete(Target),
    ConfirmDelete,
    DeleteDone {
        coordinator: CoordinatorId,
        id: ItemId,
        result: Result<(), MessageError>,
    },
    OpenCompose,
    SubmitPost(String),
    PostDone {
        coordinator: CoordinatorId,
        result: Result<Message, MessageError>,
    },
    OpenProfile,
    SubmitProfile(ProfileUpdate),
    ProfileDone {
        coordinator: CoordinatorId,
        result: Result<Person, PersonError>,
    },
    OpenTokens,
    BuyTokens(String),
    PurchaseFinished {
        product_id: String,
        outcome: PurchaseOutcome,
        balance: Option<u64>,
    },

    /// Dismiss the topmost child screen.
    Back,
    SetTheme(Theme),
    DismissToast(u64),
    Quit,
}

// ──────────────────── commands ────────────────────

/// Side-effects for the runtime.
#[derive(Debug)]
pub enum AppCmd {
    None,
    Batch(Vec<Self>),
    FetchPage {
        list: ListKey,
        ticket: FetchTicket,
    },
    SignIn {
        username: String,
        password: String,
    },
    SignUp(SignUpRequest),
    ClearCredentials,
    FetchMessage {
        coordinator: CoordinatorId,
        id: ItemId,
    },
    React {
        /// Detail coordinator the reaction came from, if any.
        origin: Option<CoordinatorId>,
        reaction: Reaction,
        id: ItemId,
        on: bool,
    },
    Appreciate {
        coordinator: CoordinatorId,
        id: ItemId,
    },
    DeleteMessage {
        coordinator: CoordinatorId,
        id: ItemId,
    },
    PostMessage {
        coordinator: CoordinatorId,
        body: String,
    },
    UpdateProfile {
        coordinator: CoordinatorId,
        update: ProfileUpdate,
    },
    BeginPurchase {
        product_id: String,
    },
    PersistTheme(Theme),
    MarkOnboarded,
    Log(ActivityEvent),
    Quit,
}

impl AppCmd {
    /// Flatten into a list, dropping `None`s.
    pub fn into_vec(self) -> Vec<Self> {
        match self {
            Self::None => Vec::new(),
            Self::Batch(cmds) => cmds.into_iter().flat_map(Self::into_vec).collect(),
            other => vec![other],
        }
    }

    pub(crate) fn batch(cmds: Vec<Self>) -> Self {
        let mut flat: Vec<Self> = cmds.into_iter().flat_map(Self::into_vec).collect();
        match flat.len() {
            0 => Self::None,
            1 => flat.pop().unwrap_or(Self::None),
            _ => Self::Batch(flat),
        }
    }
}

// ──────────────────── model ────────────────────

/// The whole client state.
#[derive(Debug)]
pub struct AppModel {
    pub arena: CoordinatorArena,
    pub nav: NavigationStack,
    /// Root coordinator of the visible flow (sign-in, onboarding or a tab).
    pub root: Option<CoordinatorId>,
    pub active_tab: ListKey,
    pub session: Session,
    pub feed: PaginatedViewModel<Message>,
    pub saved: PaginatedViewModel<Message>,
    pub people: PaginatedViewModel<Person>,
    pub notifications: PaginatedViewModel<UserNotification>,
    /// Message shown by each live detail coordinator.
    pub details: HashMap<CoordinatorId, Message>,
    /// Field errors of the most recent rejected form.
    pub form_errors: Vec<ValidationReason>,
    pub toasts: Vec<Toast>,
    pub next_toast_id: u64,
    pub theme: Theme,
    pub quit: bool,
}

impl AppModel {
    pub fn new(page_size: usize, theme: Theme) -> Self {
        Self {
            arena: CoordinatorArena::new(),
            nav: NavigationStack::new(),
            root: None,
            active_tab: ListKey::Feed,
            session: Session::SignedOut,
            feed: PaginatedViewModel::new(page_size, empty_states(ListKey::Feed)),
            saved: PaginatedViewModel::new(page_size, empty_states(ListKey::Saved)),
            people: PaginatedViewModel::new(page_size, empty_states(ListKey::HelpfulPeople)),
            notifications: PaginatedViewModel::new(
                page_size,
                empty_states(ListKey::Notifications),
            ),
            details: HashMap::new(),
            form_errors: Vec::new(),
            toasts: Vec::new(),
            next_toast_id: 0,
            theme,
            quit: false,
        }
    }

    pub fn push_toast(&mut self, level: ToastLevel, message: impl Into<String>) -> u64 {
        let id = self.next_toast_id;
        self.next_toast_id += 1;
        self.toasts.push(Toast {
            id,
            level,
            message: message.into(),
        });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
        id
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.session, Session::SignedIn { .. })
    }

    pub fn token_balance(&self) -> u64 {
        match self.session {
            Session::SignedIn { token_balance, .. } => token_balance,
            Session::SignedOut => 0,
        }
    }

    /// Coordinator owning the topmost screen.
    pub fn top_owner(&self) -> Option<CoordinatorId> {
        self.nav.top().map(|entry| entry.owner)
    }

    pub fn current_route(&self) -> Option<&Route> {
        self.nav.top().map(|entry| &entry.route)
    }

    /// Message list by key; `None` for non-message lists.
    pub fn message_list(&self, list: ListKey) -> Option<&PaginatedViewModel<Message>> {
        match list {
            ListKey::Feed => Some(&self.feed),
            ListKey::Saved => Some(&self.saved),
            ListKey::HelpfulPeople | ListKey::Notifications => None,
        }
    }

    pub fn message_list_mut(&mut self, list: ListKey) -> Option<&mut PaginatedViewModel<Message>> {
        match list {
            ListKey::Feed => Some(&mut self.feed),
            ListKey::Saved => Some(&mut self.saved),
            ListKey::HelpfulPeople | ListKey::Notifications => None,
        }
    }

    pub fn item_count(&self, list: ListKey) -> usize {
        match list {
            ListKey::Feed => self.feed.data().item_count(),
            ListKey::Saved => self.saved.data().item_count(),
            ListKey::HelpfulPeople => self.people.data().item_count(),
            ListKey::Notifications => self.notifications.data().item_count(),
        }
    }

    pub fn total_count(&self, list: ListKey) -> u64 {
        match list {
            ListKey::Feed => self.feed.data().total_count(),
            ListKey::Saved => self.saved.data().total_count(),
            ListKey::HelpfulPeople => self.people.data().total_count(),
            ListKey::Notifications => self.notifications.data().total_count(),
        }
    }

    pub fn fetch_state(&self, list: ListKey) -> FetchState {
        match list {
            ListKey::Feed => self.feed.state(),
            ListKey::Saved => self.saved.state(),
            ListKey::HelpfulPeople => self.people.state(),
            ListKey::Notifications => self.notifications.state(),
        }
    }

    pub fn empty_state(&self, list: ListKey) -> Option<&EmptyState> {
        match list {
            ListKey::Feed => self.feed.empty_state(),
            ListKey::Saved => self.saved.empty_state(),
            ListKey::HelpfulPeople => self.people.empty_state(),
            ListKey::Notifications => self.notifications.empty_state(),
        }
    }

    /// Message of the topmost live detail screen.
    pub fn top_detail(&self) -> Option<(CoordinatorId, &Message)> {
        self.nav.entries().iter().rev().find_map(|entry| {
            matches!(entry.route, Route::MessageDetail { .. })
                .then(|| self.details.get(&entry.owner).map(|m| (entry.owner, m)))
                .flatten()
        })
    }

    pub(crate) fn clear_lists(&mut self) {
        self.feed.clear();
        self.saved.clear();
        self.people.clear();
        self.notifications.clear();
    }
}

/// Placeholders per list. The load-failed variant is shared.
pub fn empty_states(list: ListKey) -> EmptyStates {
    let defaults = EmptyStates::default();
    let no_data = match list {
        ListKey::Feed => EmptyState::new(
            "No messages yet",
            "Be the first to share something kind.",
            Some("empty_feed"),
        ),
        ListKey::Saved => EmptyState::new(
            "Nothing saved",
            "Save a message to find it here later.",
            Some("empty_saved"),
        ),
        ListKey::HelpfulPeople => EmptyState::new(
            "No helpful people yet",
            "People who receive appreciation show up here.",
            Some("empty_people"),
        ),
        ListKey::Notifications => EmptyState::new(
            "You're all caught up",
            "New loves and appreciations will appear here.",
            Some("empty_notifications"),
        ),
    };
    EmptyStates {
        no_data,
        load_failed: defaults.load_failed,
    }
}

// ──────────────────── tests ────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> AppModel {
        AppModel::new(20, Theme::System)
    }

    #[test]
    fn new_model_is_signed_out_and_empty() {
        let m = model();
        assert!(!m.is_signed_in());
        assert!(m.root.is_none());
        assert!(m.nav.is_empty());
        for list in ListKey::ALL {
            assert_eq!(m.item_count(list), 0);
            assert!(m.empty_state(list).is_none());
        }
    }

    #[test]
    fn toasts_evict_oldest() {
        let mut m = model();
        for n in 0..5 {
            m.push_toast(ToastLevel::Info, format!("t{n}"));
        }
        assert_eq!(m.toasts.len(), MAX_TOASTS);
        assert_eq!(m.toasts[0].message, "t2");
        assert_eq!(m.toasts[2].id, 4);
    }

    #[test]
    fn batch_flattens_and_drops_none() {
        let cmd = AppCmd::batch(vec![
            AppCmd::None,
            AppCmd::Batch(vec![AppCmd::MarkOnboarded, AppCmd::None]),
        ]);
        assert!(matches!(cmd, AppCmd::MarkOnboarded));
        assert!(matches!(AppCmd::batch(vec![]), AppCmd::None));
    }

    #[test]
    fn per_list_placeholders_share_failure_copy() {
        let feed = empty_states(ListKey::Feed);
        let saved = empty_states(ListKey::Saved);
        assert_ne!(feed.no_data, saved.no_data);
        assert_eq!(feed.load_failed, saved.load_failed);
    }

    #[test]
    fn only_message_lists_are_message_lists() {
        let m = model();
        assert!(m.message_list(ListKey::Feed).is_some());
        assert!(m.message_list(ListKey::Saved).is_some());
        assert!(m.message_list(ListKey::HelpfulPeople).is_none());
    }
}
