//! Background activity logger.
//!
//! A dedicated thread owns the [`JsonlWriter`]. Everything else sends
//! [`ActivityEvent`]s through a bounded crossbeam channel with `try_send`, so
//! the main queue is never blocked by logging back-pressure.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::core::errors::{NightlightError, Result};
use crate::logger::jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};

// ──────────────────── channel capacity ────────────────────

const CHANNEL_CAPACITY: usize = 512;

// ──────────────────── public event type ────────────────────

#[derive(Debug, Clone)]
pub enum ActivityEvent {
    SessionStarted {
        version: String,
        config_hash: String,
        username: Option<String>,
    },
    SessionStopped {
        reason: String,
    },
    PageFetchStarted {
        list: String,
        from_start: bool,
    },
    PageFetchCompleted {
        list: String,
        items: u64,
        total: u64,
        duration_ms: u64,
    },
    PageFetchFailed {
        list: String,
        message: String,
    },
    CoordinatorStarted {
        coordinator: String,
        route: String,
    },
    CoordinatorFinished {
        coordinator: String,
        route: String,
        outcome: String,
    },
    ActionFailed {
        action: String,
        message: String,
    },
    PurchaseCompleted {
        product_id: String,
        outcome: String,
        ok: bool,
    },
    Error {
        code: String,
        message: String,
    },
    /// Asks the logger thread to flush and exit.
    Shutdown,
}

impl ActivityEvent {
    pub fn from_error(err: &NightlightError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

// ──────────────────── public handle ────────────────────

/// Cheap to clone; safe to use from any thread.
#[derive(Clone)]
pub struct ActivityLoggerHandle {
    tx: Sender<ActivityEvent>,
    dropped_events: Arc<AtomicU64>,
}

impl ActivityLoggerHandle {
    /// Handle whose events go nowhere (logging disabled).
    pub fn disabled() -> Self {
        let (tx, _rx) = bounded(1);
        Self {
            tx,
            dropped_events: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Non-blocking. A full channel drops the event and bumps the counter.
    pub fn send(&self, event: ActivityEvent) {
        if let Err(TrySendError::Full(_)) = self.tx.try_send(event) {
            self.dropped_events.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(ActivityEvent::Shutdown);
    }
}

// ──────────────────── spawn ────────────────────

pub fn spawn_logger(config: JsonlConfig) -> Result<(ActivityLoggerHandle, thread::JoinHandle<()>)> {
    spawn_logger_with_capacity(config, CHANNEL_CAPACITY)
}

pub fn spawn_logger_with_capacity(
    config: JsonlConfig,
    capacity: usize,
) -> Result<(ActivityLoggerHandle, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded::<ActivityEvent>(capacity);
    let dropped = Arc::new(AtomicU64::new(0));
    let handle = ActivityLoggerHandle {
        tx,
        dropped_events: Arc::clone(&dropped),
    };

    let join = thread::Builder::new()
        .name("nightlight-logger".to_string())
        .spawn(move || logger_thread_main(&rx, config, &dropped))
        .map_err(|e| NightlightError::Runtime {
            details: format!("failed to spawn logger thread: {e}"),
        })?;

    Ok((handle, join))
}

// ──────────────────── logger thread ────────────────────

fn logger_thread_main(rx: &Receiver<ActivityEvent>, config: JsonlConfig, dropped: &AtomicU64) {
    let mut jsonl = JsonlWriter::open(config);

    while let Ok(event) = rx.recv() {
        let d = dropped.swap(0, Ordering::Relaxed);
        if d > 0 {
            let mut warn = LogEntry::new(EventType::Error, Severity::Warning);
            warn.details = Some(format!("{d} log events dropped due to back-pressure"));
            jsonl.write_entry(&warn);
        }

        if matches!(event, ActivityEvent::Shutdown) {
            break;
        }
        jsonl.write_entry(&event_to_log_entry(&event));
    }

    jsonl.flush();
    jsonl.fsync();
}

// ──────────────────── event conversion ────────────────────

fn event_to_log_entry(event: &ActivityEvent) -> LogEntry {
    match event {
        ActivityEvent::SessionStarted {
            version,
            config_hash,
            username,
        } => {
            let mut e = LogEntry::new(EventType::SessionStart, Severity::Info);
            e.details = Some(match username {
                Some(user) => format!("version={version} config_hash={config_hash} user={user}"),
                None => format!("version={version} config_hash={config_hash} signed_out"),
            });
            e.ok = Some(true);
            e
        }
        ActivityEvent::SessionStopped { reason } => {
            let mut e = LogEntry::new(EventType::SessionStop, Severity::Info);
            e.details = Some(reason.clone());
            e
        }
        ActivityEvent::PageFetchStarted { list, from_start } => {
            let mut e = LogEntry::new(EventType::PageFetch, Severity::Info);
            e.list = Some(list.clone());
            e.details = Some(if *from_start { "first_page" } else { "next_page" }.to_string());
            e
        }
        ActivityEvent::PageFetchCompleted {
            list,
            items,
            total,
            duration_ms,
        } => {
            let mut e = LogEntry::new(EventType::PageFetch, Severity::Info);
            e.list = Some(list.clone());
            e.items = Some(*items);
            e.total = Some(*total);
            e.duration_ms = Some(*duration_ms);
            e.ok = Some(true);
            e
        }
        ActivityEvent::PageFetchFailed { list, message } => {
            let mut e = LogEntry::new(EventType::PageFetch, Severity::Warning);
            e.list = Some(list.clone());
            e.error_message = Some(message.clone());
            e.ok = Some(false);
            e
        }
        ActivityEvent::CoordinatorStarted { coordinator, route } => {
            let mut e = LogEntry::new(EventType::Navigation, Severity::Info);
            e.coordinator = Some(coordinator.clone());
            e.route = Some(route.clone());
            e.details = Some("started".to_string());
            e
        }
        ActivityEvent::CoordinatorFinished {
            coordinator,
            route,
            outcome,
        } => {
            let mut e = LogEntry::new(EventType::Navigation, Severity::Info);
            e.coordinator = Some(coordinator.clone());
            e.route = Some(route.clone());
            e.details = Some(format!("finished: {outcome}"));
            e
        }
        ActivityEvent::ActionFailed { action, message } => {
            let mut e = LogEntry::new(EventType::Action, Severity::Warning);
            e.details = Some(action.clone());
            e.error_message = Some(message.clone());
            e.ok = Some(false);
            e
        }
        ActivityEvent::PurchaseCompleted {
            product_id,
            outcome,
            ok,
        } => {
            let mut e = LogEntry::new(EventType::Purchase, Severity::Info);
            e.details = Some(format!("{product_id}: {outcome}"));
            e.ok = Some(*ok);
            e
        }
        ActivityEvent::Error { code, message } => {
            let mut e = LogEntry::new(EventType::Error, Severity::Critical);
            e.error_code = Some(code.clone());
            e.error_message = Some(message.clone());
            e.ok = Some(false);
            e
        }
        // Handled by the thread loop.
        ActivityEvent::Shutdown => LogEntry::new(EventType::SessionStop, Severity::Info),
    }
}
