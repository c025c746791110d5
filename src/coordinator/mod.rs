//! Parent/child navigation graph and cross-screen event routing.

pub mod arena;
pub mod event;
pub mod navigator;

pub use arena::{CoordinatorArena, CoordinatorId, Delivery, Lifecycle, RowContext};
pub use event::{FlowFailure, NavigationEvent};
pub use navigator::{NavigationStack, Navigator, Presentation, Route, StackEntry};
