//! Main-queue dispatch.

pub mod main_queue;

pub use main_queue::{MainQueue, MainQueueHandle, spawn_worker};
