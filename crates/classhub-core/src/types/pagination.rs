//! Cursor pagination over time-ordered rows.

use serde::{Deserialize, Serialize};

/// One page of a backward walk through history.
///
/// Items are in ascending (oldest first) order so clients can prepend the
/// page to what they already hold without re-sorting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    /// The items on this page, oldest first.
    pub items: Vec<T>,
    /// Whether at least one older item exists beyond this page.
    pub has_more: bool,
}

impl<T> CursorPage<T> {
    /// Build a page from rows fetched newest-first with a limit of
    /// `limit + 1`. The extra row, when present, only signals `has_more`
    /// and is discarded.
    pub fn from_newest_first(mut rows: Vec<T>, limit: usize) -> Self {
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        rows.reverse();
        Self {
            items: rows,
            has_more,
        }
    }

    /// Map every item, preserving order and `has_more`.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> CursorPage<U> {
        CursorPage {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }

    /// An empty page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overfetched_row_sets_has_more() {
        let rows: Vec<u32> = (10..=30).rev().collect();
        let page = CursorPage::from_newest_first(rows, 20);
        assert!(page.has_more);
        assert_eq!(page.items.first(), Some(&11));
        assert_eq!(page.items.last(), Some(&30));
        assert_eq!(page.items.len(), 20);
    }

    #[test]
    fn test_short_page_has_no_more() {
        let rows: Vec<u32> = (1..=10).rev().collect();
        let page = CursorPage::from_newest_first(rows, 20);
        assert!(!page.has_more);
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
    }
}
