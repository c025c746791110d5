//! Observable current theme.
//!
//! Screens that need to restyle subscribe and receive every subsequent change
//! on their own channel. The state is injected wherever it is needed rather
//! than broadcast process-wide.

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;

use crate::store::preferences::Theme;

#[derive(Debug)]
pub struct ThemeState {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    current: Theme,
    subscribers: Vec<Sender<Theme>>,
}

impl ThemeState {
    pub fn new(initial: Theme) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn current(&self) -> Theme {
        self.inner.lock().current
    }

    /// Receive every change made after this call.
    pub fn subscribe(&self) -> Receiver<Theme> {
        let (tx, rx) = unbounded();
        self.inner.lock().subscribers.push(tx);
        rx
    }

    /// Change the theme. Returns `false` (and notifies nobody) when unchanged.
    pub fn set(&self, theme: Theme) -> bool {
        let mut inner = self.inner.lock();
        if inner.current == theme {
            return false;
        }
        inner.current = theme;
        inner.subscribers.retain(|tx| tx.send(theme).is_ok());
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}
