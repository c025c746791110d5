#![forbid(unsafe_code)]

//! Nightlight: headless client core for a kind-messages app.
//!
//! Pieces, bottom-up:
//! 1. **API layer** ([`api`]): typed services over a pluggable HTTP transport,
//!    with per-domain error enums that know how to present themselves
//! 2. **Paging** ([`paging`]): cursor pager, list data source and the view
//!    model that admits one fetch at a time and discards stale completions
//! 3. **Coordinators** ([`coordinator`]): a generational arena of flows with
//!    a navigation stack, parent/child context and result delivery
//! 4. **App** ([`app`]): a pure `update` reducer plus the runtime that runs
//!    its commands on worker threads and feeds results back
//!
//! # Library usage
//!
//! ```rust,no_run
//! use nightlight::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use nightlight::core::config::Config;
//! use nightlight::paging::{CursorPager, PaginatedViewModel};
//! ```

pub mod prelude;

pub mod api;
pub mod app;
pub mod coordinator;
pub mod core;
pub mod logger;
pub mod paging;
pub mod purchase;
pub mod push;
pub mod runtime;
pub mod store;
