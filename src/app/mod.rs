//! Application state machine and the runtime that drives it.
//!
//! [`update`] is a pure reducer over [`AppModel`]; [`AppRuntime`] executes the
//! [`AppCmd`]s it returns on worker threads and feeds results back through
//! the main queue.

pub mod context;
pub mod model;
pub mod runtime;
pub mod update;
pub mod validation;

pub use context::ClientContext;
pub use model::{
    AppCmd, AppModel, AppMsg, MAX_TOASTS, PageResult, Reaction, Session, Target, Toast, ToastLevel,
};
pub use runtime::{AppRuntime, UnavailablePaymentQueue};
pub use update::update;
