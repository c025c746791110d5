//! Ordered item collection backing one list screen.

#![allow(missing_docs)]

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Stable identity of a list item, independent of its row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&String> for ItemId {
    fn from(raw: &String) -> Self {
        Self(raw.clone())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Items that carry a stable identity.
pub trait Identified {
    fn item_id(&self) -> ItemId;
}

// ──────────────────── empty states ────────────────────

/// Placeholder shown when a list has nothing to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub subtitle: String,
    /// Asset name of the illustration, if any.
    pub image: Option<String>,
}

impl EmptyState {
    pub fn new(title: &str, subtitle: &str, image: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            image: image.map(str::to_string),
        }
    }
}

/// The two placeholders a list is configured with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyStates {
    pub no_data: EmptyState,
    pub load_failed: EmptyState,
}

impl Default for EmptyStates {
    fn default() -> Self {
        Self {
            no_data: EmptyState::new("Nothing here yet", "Pull to refresh.", None),
            load_failed: EmptyState::new(
                "Could not load",
                "Check your connection and pull to refresh.",
                Some("connection_error"),
            ),
        }
    }
}

// ──────────────────── data source ────────────────────

/// Insertion-ordered items plus the server's total.
///
/// Once a total is known the item count never exceeds it; a page that would
/// overflow raises the total to match.
#[derive(Debug, Clone)]
pub struct ListDataSource<T> {
    items: Vec<T>,
    total_count: Option<u64>,
    empty_states: EmptyStates,
}

impl<T> Default for ListDataSource<T> {
    fn default() -> Self {
        Self::new(EmptyStates::default())
    }
}

impl<T> ListDataSource<T> {
    pub fn new(empty_states: EmptyStates) -> Self {
        Self {
            items: Vec::new(),
            total_count: None,
            empty_states,
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Server total; zero until the first page arrives.
    pub fn total_count(&self) -> u64 {
        self.total_count.unwrap_or(0)
    }

    pub fn set_total_count(&mut self, total: u64) {
        self.total_count = Some(total.max(self.items.len() as u64));
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.clamp_total();
    }

    /// Append a page, returning the rows it now occupies.
    pub fn append_page(&mut self, items: Vec<T>) -> Range<usize> {
        let start = self.items.len();
        self.items.extend(items);
        self.clamp_total();
        start..self.items.len()
    }

    /// Remove exactly one row; later rows shift up.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        if let Some(total) = self.total_count.as_mut() {
            *total = total.saturating_sub(1);
        }
        Some(removed)
    }

    /// Replace the row in place. Returns `false` when out of range.
    pub fn update_at(&mut self, index: usize, item: T) -> bool {
        match self.items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// The last loaded row is visible and the server has more.
    pub fn is_near_end(&self, visible_index: usize) -> bool {
        let count = self.items.len();
        visible_index >= count.saturating_sub(1) && (count as u64) < self.total_count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total_count = None;
    }

    pub fn empty_states(&self) -> &EmptyStates {
        &self.empty_states
    }

    /// Placeholder for an empty list after a completed fetch.
    pub fn empty_state(&self, failed: bool) -> &EmptyState {
        if failed {
            &self.empty_states.load_failed
        } else {
            &self.empty_states.no_data
        }
    }

    fn clamp_total(&mut self) {
        let len = self.items.len() as u64;
        if let Some(total) = self.total_count.as_mut()
            && *total < len
        {
            *total = len;
        }
    }
}

impl<T: Identified> ListDataSource<T> {
    /// Current row of the item with this identity.
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.item_id() == id)
    }

    /// Replace the item with this identity wherever it now sits.
    pub fn update_by_id(&mut self, item: T) -> Option<usize> {
        let index = self.position_of(&item.item_id())?;
        self.items[index] = item;
        Some(index)
    }

    pub fn remove_by_id(&mut self, id: &ItemId) -> Option<T> {
        let index = self.position_of(id)?;
        self.remove_at(index)
    }
}
