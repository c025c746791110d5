//! Cursor bookkeeping for one paginated list.
//!
//! A fetch is admitted when nothing is in flight and either no page has been
//! loaded yet (`start` unset) or the server handed back an `end` cursor to
//! continue from. `end == None` after a completed fetch means the list is
//! exhausted until [`CursorPager::reset`].

use crate::api::page::{Cursor, PageRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorPager {
    start_cursor: Option<Cursor>,
    end_cursor: Option<Cursor>,
    total_count: u64,
    fetch_in_flight: bool,
}

impl CursorPager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing in flight, and either no page yet or a cursor to continue from.
    pub fn can_fetch_next_page(&self) -> bool {
        !self.fetch_in_flight && (self.end_cursor.is_some() || self.start_cursor.is_none())
    }

    /// Mark a fetch as in flight.
    pub fn begin_fetch(&mut self) {
        self.fetch_in_flight = true;
    }

    /// Record the boundaries of a loaded page and clear the in-flight flag.
    pub fn complete_fetch(&mut self, new_start: Cursor, new_end: Option<Cursor>, total: u64) {
        self.start_cursor = Some(new_start);
        self.end_cursor = new_end;
        self.total_count = total;
        self.fetch_in_flight = false;
    }

    /// Clear the in-flight flag after an error. Cursors stay where they were,
    /// so a retry resumes from the same boundary.
    pub fn fail_fetch(&mut self) {
        self.fetch_in_flight = false;
    }

    /// Forget both cursors so the next fetch is a first-page fetch.
    /// The total and the in-flight flag are left alone.
    pub fn reset(&mut self) {
        self.start_cursor = None;
        self.end_cursor = None;
    }

    /// Request for the page after the last completed one.
    pub fn next_request(&self, limit: usize) -> PageRequest {
        let cursor = if self.start_cursor.is_none() {
            None
        } else {
            self.end_cursor.clone()
        };
        PageRequest { cursor, limit }
    }

    /// A fetch was begun and has not completed or failed.
    pub fn is_fetching(&self) -> bool {
        self.fetch_in_flight
    }

    /// Total reported by the most recent page.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Start cursor of the most recently loaded page.
    pub fn start_cursor(&self) -> Option<&Cursor> {
        self.start_cursor.as_ref()
    }

    /// Cursor to continue from, if the server gave one.
    pub fn end_cursor(&self) -> Option<&Cursor> {
        self.end_cursor.as_ref()
    }

    /// A page has been loaded and the server reported no further one.
    pub fn is_exhausted(&self) -> bool {
        self.start_cursor.is_some() && self.end_cursor.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_pager_admits_exactly_one_first_fetch() {
        let mut pager = CursorPager::new();
        assert!(pager.can_fetch_next_page());
        assert_eq!(pager.next_request(20), PageRequest::first(20));
        pager.begin_fetch();
        assert!(!pager.can_fetch_next_page());
        pager.complete_fetch(Cursor::from("c1"), Some(Cursor::from("c2")), 42);
        assert!(pager.can_fetch_next_page());
        assert_eq!(pager.total_count(), 42);
    }

    #[test]
    fn failure_reopens_without_moving_cursors() {
        let mut pager = CursorPager::new();
        pager.begin_fetch();
        pager.complete_fetch(Cursor::from("c1"), Some(Cursor::from("c2")), 5);
        pager.begin_fetch();
        pager.fail_fetch();
        assert!(pager.can_fetch_next_page());
        assert_eq!(pager.next_request(5).cursor, Some(Cursor::from("c2")));
    }

    #[test]
    fn missing_end_exhausts_the_list() {
        let mut pager = CursorPager::new();
        pager.begin_fetch();
        pager.complete_fetch(Cursor::from("c1"), None, 3);
        assert!(pager.is_exhausted());
        assert!(!pager.can_fetch_next_page());
    }

    #[test]
    fn reset_restores_first_fetch_semantics() {
        let mut pager = CursorPager::new();
        pager.begin_fetch();
        pager.complete_fetch(Cursor::from("c1"), None, 3);
        pager.reset();
        assert!(pager.can_fetch_next_page());
        assert_eq!(pager.next_request(10).cursor, None);
        assert_eq!(pager.total_count(), 3);
    }

    #[test]
    fn reset_does_not_clear_in_flight() {
        let mut pager = CursorPager::new();
        pager.begin_fetch();
        pager.reset();
        assert!(pager.is_fetching());
        assert!(!pager.can_fetch_next_page());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Begin,
        Complete(bool),
        Fail,
        Reset,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Begin),
            any::<bool>().prop_map(Op::Complete),
            Just(Op::Fail),
            Just(Op::Reset),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// The admission rule holds after any sequence of operations.
        #[test]
        fn admission_matches_state(ops in prop::collection::vec(arb_op(), 1..60)) {
            let mut pager = CursorPager::new();
            for (n, op) in ops.into_iter().enumerate() {
                match op {
                    Op::Begin => pager.begin_fetch(),
                    Op::Complete(more) => {
                        let end = more.then(|| Cursor::new(format!("e{n}")));
                        pager.complete_fetch(Cursor::new(format!("s{n}")), end, n as u64);
                    }
                    Op::Fail => pager.fail_fetch(),
                    Op::Reset => pager.reset(),
                }
                let expected = !pager.is_fetching()
                    && (pager.end_cursor().is_some() || pager.start_cursor().is_none());
                prop_assert_eq!(pager.can_fetch_next_page(), expected);
                if pager.is_exhausted() {
                    prop_assert!(!pager.can_fetch_next_page());
                }
            }
        }

        /// Cursors are replayed byte-for-byte.
        #[test]
        fn end_cursor_is_echoed_verbatim(raw in ".{0,40}") {
            let mut pager = CursorPager::new();
            pager.begin_fetch();
            pager.complete_fetch(Cursor::from("s"), Some(Cursor::new(raw.clone())), 1);
            let request = pager.next_request(7);
            prop_assert_eq!(request.cursor.as_ref().map(Cursor::as_str), Some(raw.as_str()));
        }
    }
}
