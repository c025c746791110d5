//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use nightlight::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{NightlightError, Result};

// API
pub use crate::api::errors::{
    AuthError, MessageError, PersonError, UserFacing, UserNotificationError, ValidationReason,
};
pub use crate::api::http::{ApiClient, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use crate::api::models::{Message, Person, UserNotification};
pub use crate::api::page::{Cursor, Page, PageRequest};
pub use crate::api::services::Services;

// Paging
pub use crate::paging::{
    CursorPager, EmptyState, EmptyStates, FetchOutcome, ListDataSource, ListKey, PageSource,
    PaginatedViewModel,
};

// Coordinators
pub use crate::coordinator::{
    CoordinatorArena, CoordinatorId, FlowFailure, NavigationEvent, Navigator, Route,
};

// App
pub use crate::app::{AppModel, AppMsg, AppRuntime, ClientContext, update};

// Stores
pub use crate::store::credentials::CredentialStore;
pub use crate::store::preferences::{Theme, UserPreferences};
pub use crate::store::secure::{FileSecureStore, MemorySecureStore, SecureStore};
