//! Screen-level view model: a pager plus a data source behind a single
//! `fetch(from_start)` entry point.
//!
//! The view model never performs I/O itself. [`PaginatedViewModel::fetch`]
//! hands out a [`FetchTicket`] describing the request; whoever runs the
//! request (a worker thread, or [`PaginatedViewModel::fetch_blocking`] in
//! synchronous shells) feeds the result back through
//! [`PaginatedViewModel::complete`] on the main queue.

use std::ops::Range;

use crate::api::page::{Page, PageRequest};
use crate::paging::data_source::{EmptyState, EmptyStates, ListDataSource};
use crate::paging::pager::CursorPager;

/// Backend endpoint that yields pages of one item type.
pub trait PageSource: Send + Sync {
    type Item: Clone + Send + 'static;
    type Error: Send + 'static;

    fn fetch_page(&self, request: &PageRequest) -> Result<Page<Self::Item>, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle { has_data: bool },
    Fetching { from_start: bool },
    Failed { has_data: bool },
}

/// Admission slip for one fetch. Carried to the worker and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub from_start: bool,
    pub request: PageRequest,
}

/// What a completion did to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<E> {
    Replaced { count: usize },
    Appended(Range<usize>),
    Failed(E),
    /// The list was cleared after the ticket was issued.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct PaginatedViewModel<T> {
    pager: CursorPager,
    data: ListDataSource<T>,
    state: FetchState,
    page_size: usize,
    generation: u64,
    completed_once: bool,
}

impl<T> PaginatedViewModel<T> {
    pub fn new(page_size: usize, empty_states: EmptyStates) -> Self {
        Self {
            pager: CursorPager::new(),
            data: ListDataSource::new(empty_states),
            state: FetchState::Idle { has_data: false },
            page_size,
            generation: 0,
            completed_once: false,
        }
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn pager(&self) -> &CursorPager {
        &self.pager
    }

    pub fn data(&self) -> &ListDataSource<T> {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ListDataSource<T> {
        &mut self.data
    }

    pub fn items(&self) -> &[T] {
        self.data.items()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a fetch if the pager admits one.
    ///
    /// `from_start` (pull-to-refresh) resets the cursors first. A fetch with
    /// no page loaded yet is treated as from-start so its result replaces
    /// whatever the list still shows. Refused while another fetch is in
    /// flight, including refreshes.
    pub fn fetch(&mut self, from_start: bool) -> Option<FetchTicket> {
        if self.pager.is_fetching() {
            return None;
        }
        let from_start = from_start || self.pager.start_cursor().is_none();
        if from_start {
            self.pager.reset();
        }
        if !self.pager.can_fetch_next_page() {
            return None;
        }

        let request = self.pager.next_request(self.page_size);
        self.pager.begin_fetch();
        self.state = FetchState::Fetching { from_start };
        Some(FetchTicket {
            generation: self.generation,
            from_start,
            request,
        })
    }

    /// Fetch the next page if `visible_index` reached the loaded tail.
    pub fn prefetch(&mut self, visible_index: usize) -> Option<FetchTicket> {
        if !self.data.is_near_end(visible_index) || !self.pager.can_fetch_next_page() {
            return None;
        }
        self.fetch(false)
    }

    /// Apply a fetch result. No automatic retry on failure.
    pub fn complete<E>(&mut self, ticket: &FetchTicket, result: Result<Page<T>, E>) -> FetchOutcome<E> {
        if ticket.generation != self.generation {
            return FetchOutcome::Discarded;
        }
        self.completed_once = true;

        match result {
            Ok(page) => {
                let Page { metadata, data } = page;
                self.pager
                    .complete_fetch(metadata.start, metadata.end, metadata.total);
                let outcome = if ticket.from_start {
                    let count = data.len();
                    self.data.replace_all(data);
                    FetchOutcome::Replaced { count }
                } else {
                    FetchOutcome::Appended(self.data.append_page(data))
                };
                self.data.set_total_count(metadata.total);
                self.state = FetchState::Idle {
                    has_data: !self.data.is_empty(),
                };
                outcome
            }
            Err(error) => {
                self.pager.fail_fetch();
                self.state = FetchState::Failed {
                    has_data: !self.data.is_empty(),
                };
                FetchOutcome::Failed(error)
            }
        }
    }

    /// Run one fetch to completion on the calling thread.
    pub fn fetch_blocking<S>(&mut self, source: &S, from_start: bool) -> Option<FetchOutcome<S::Error>>
    where
        S: PageSource<Item = T>,
    {
        let ticket = self.fetch(from_start)?;
        let result = source.fetch_page(&ticket.request);
        Some(self.complete(&ticket, result))
    }

    /// Placeholder to show, if the list is empty after a completed fetch.
    pub fn empty_state(&self) -> Option<&EmptyState> {
        if !self.completed_once || !self.data.is_empty() {
            return None;
        }
        match self.state {
            FetchState::Fetching { .. } => None,
            FetchState::Idle { .. } => Some(self.data.empty_state(false)),
            FetchState::Failed { .. } => Some(self.data.empty_state(true)),
        }
    }

    /// Drop all items and cursors. Outstanding tickets become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.pager = CursorPager::new();
        self.data.clear();
        self.state = FetchState::Idle { has_data: false };
        self.completed_once = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::page::{Cursor, PageMetadata};

    fn page(start: &str, end: Option<&str>, total: u64, items: &[u32]) -> Page<u32> {
        Page {
            metadata: PageMetadata {
                start: Cursor::from(start),
                end: end.map(Cursor::from),
                total,
            },
            data: items.to_vec(),
        }
    }

    fn vm() -> PaginatedViewModel<u32> {
        PaginatedViewModel::new(10, EmptyStates::default())
    }

    #[test]
    fn first_page_then_next_page() {
        let mut vm = vm();
        let ticket = vm.fetch(false).unwrap();
        assert!(ticket.from_start);
        assert_eq!(ticket.request.cursor, None);
        assert_eq!(vm.state(), FetchState::Fetching { from_start: true });

        let outcome = vm.complete::<()>(&ticket, Ok(page("c1", Some("c2"), 4, &[1, 2])));
        assert_eq!(outcome, FetchOutcome::Replaced { count: 2 });
        assert_eq!(vm.state(), FetchState::Idle { has_data: true });

        let next = vm.prefetch(1).unwrap();
        assert!(!next.from_start);
        assert_eq!(next.request.cursor, Some(Cursor::from("c2")));
        let outcome = vm.complete::<()>(&next, Ok(page("c2", None, 4, &[3, 4])));
        assert_eq!(outcome, FetchOutcome::Appended(2..4));
        assert_eq!(vm.items(), &[1, 2, 3, 4]);
        assert!(vm.prefetch(3).is_none());
    }

    #[test]
    fn second_fetch_refused_while_in_flight() {
        let mut vm = vm();
        let _ticket = vm.fetch(false).unwrap();
        assert!(vm.fetch(false).is_none());
        assert!(vm.fetch(true).is_none());
    }

    #[test]
    fn failure_keeps_items_and_cursors() {
        let mut vm = vm();
        let first = vm.fetch(false).unwrap();
        vm.complete::<()>(&first, Ok(page("c1", Some("c2"), 9, &[1])));
        let next = vm.fetch(false).unwrap();
        assert_eq!(vm.complete(&next, Err("offline")), FetchOutcome::Failed("offline"));
        assert_eq!(vm.state(), FetchState::Failed { has_data: true });
        assert_eq!(vm.items(), &[1]);
        assert_eq!(vm.fetch(false).unwrap().request.cursor, Some(Cursor::from("c2")));
    }

    #[test]
    fn refresh_replaces_items() {
        let mut vm = vm();
        let first = vm.fetch(false).unwrap();
        vm.complete::<()>(&first, Ok(page("c1", None, 2, &[1, 2])));
        assert!(vm.fetch(false).is_none());

        let refresh = vm.fetch(true).unwrap();
        assert_eq!(refresh.request.cursor, None);
        vm.complete::<()>(&refresh, Ok(page("c9", None, 1, &[7])));
        assert_eq!(vm.items(), &[7]);
        assert_eq!(vm.data().total_count(), 1);
    }

    #[test]
    fn stale_ticket_is_discarded_after_clear() {
        let mut vm = vm();
        let ticket = vm.fetch(false).unwrap();
        vm.clear();
        let outcome = vm.complete::<()>(&ticket, Ok(page("c1", None, 1, &[1])));
        assert_eq!(outcome, FetchOutcome::Discarded);
        assert!(vm.items().is_empty());
        assert!(vm.fetch(false).is_some());
    }

    #[test]
    fn empty_state_only_after_completion() {
        let mut vm = vm();
        assert!(vm.empty_state().is_none());
        let ticket = vm.fetch(false).unwrap();
        assert!(vm.empty_state().is_none());
        vm.complete::<()>(&ticket, Ok(page("c1", None, 0, &[])));
        assert_eq!(vm.empty_state().unwrap().title, "Nothing here yet");
    }

    struct Fixed(Vec<Page<u32>>);

    impl PageSource for Fixed {
        type Item = u32;
        type Error = String;

        fn fetch_page(&self, request: &PageRequest) -> Result<Page<u32>, String> {
            let index = match &request.cursor {
                None => 0,
                Some(cursor) => cursor.as_str().parse::<usize>().map_err(|e| e.to_string())?,
            };
            self.0.get(index).cloned().ok_or_else(|| "no such page".into())
        }
    }

    #[test]
    fn blocking_fetch_walks_all_pages() {
        let source = Fixed(vec![
            page("0", Some("1"), 3, &[10]),
            page("1", Some("2"), 3, &[11]),
            page("2", None, 3, &[12]),
        ]);
        let mut vm = vm();
        while let Some(outcome) = vm.fetch_blocking(&source, false) {
            assert!(!matches!(outcome, FetchOutcome::Failed(_)));
        }
        assert_eq!(vm.items(), &[10, 11, 12]);
        assert!(vm.pager().is_exhausted());
    }
}
