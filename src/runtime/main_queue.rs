//! The single main queue and the worker threads that feed it.
//!
//! Every model mutation happens on the thread that drains [`MainQueue`].
//! Workers run blocking calls and post their result back through a
//! [`MainQueueHandle`]; they never touch model state. A post to a queue that
//! has been dropped is silently discarded.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::core::errors::{NightlightError, Result};

/// Receiving end, owned by the main loop.
pub struct MainQueue<M> {
    tx: Sender<M>,
    rx: Receiver<M>,
}

/// Cloneable posting end for worker threads.
pub struct MainQueueHandle<M> {
    tx: Sender<M>,
}

impl<M> Clone for MainQueueHandle<M> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<M> MainQueueHandle<M> {
    /// Post a message. Returns `false` if the main loop is gone.
    pub fn post(&self, msg: M) -> bool {
        self.tx.send(msg).is_ok()
    }
}

impl<M: Send + 'static> MainQueue<M> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn handle(&self) -> MainQueueHandle<M> {
        MainQueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Take everything queued right now without blocking.
    pub fn drain(&self) -> Vec<M> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(msg) => out.push(msg),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return out,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl<M: Send + 'static> Default for MainQueue<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `job` on a named worker thread and post its result.
///
/// A job that panics posts `on_panic(reason)` instead, so the main loop
/// always hears back from every worker it started.
pub fn spawn_worker<M, F, P>(
    name: &str,
    queue: MainQueueHandle<M>,
    job: F,
    on_panic: P,
) -> Result<thread::JoinHandle<()>>
where
    M: Send + 'static,
    F: FnOnce() -> M + Send + 'static,
    P: FnOnce(String) -> M + Send + 'static,
{
    thread::Builder::new()
        .name(format!("nightlight-{name}"))
        .spawn(move || {
            let msg = match panic::catch_unwind(AssertUnwindSafe(job)) {
                Ok(msg) => msg,
                Err(payload) => on_panic(panic_reason(payload.as_ref())),
            };
            let _ = queue.post(msg);
        })
        .map_err(|e| NightlightError::Runtime {
            details: format!("failed to spawn {name} worker: {e}"),
        })
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_result_arrives_on_queue() {
        let queue: MainQueue<u32> = MainQueue::new();
        let join = spawn_worker("test", queue.handle(), || 41 + 1, |_| 0).unwrap();
        join.join().unwrap();
        assert_eq!(queue.drain(), vec![42]);
        assert!(queue.is_empty());
    }

    #[test]
    fn panicking_worker_still_reports_back() {
        let queue: MainQueue<String> = MainQueue::new();
        let join = spawn_worker(
            "crash",
            queue.handle(),
            || -> String { panic!("transport exploded") },
            |reason| format!("failed: {reason}"),
        )
        .unwrap();
        assert!(join.join().is_ok(), "panic is contained in the worker");
        assert_eq!(queue.drain(), vec!["failed: transport exploded".to_string()]);
    }

    #[test]
    fn drain_preserves_post_order() {
        let queue: MainQueue<&str> = MainQueue::new();
        let handle = queue.handle();
        assert!(handle.post("a"));
        assert!(handle.post("b"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain(), vec!["a", "b"]);
    }

    #[test]
    fn posting_after_queue_dropped_is_ignored() {
        let queue: MainQueue<u8> = MainQueue::new();
        let handle = queue.handle();
        drop(queue);
        assert!(!handle.post(1));
    }
}
