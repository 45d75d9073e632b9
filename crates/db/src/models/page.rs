//! Pagination envelope shared by every listing query.

use serde::Serialize;

/// One page of query results.
///
/// `has_more` is derived by fetching one row past the requested limit, so
/// clients can paginate without a separate COUNT round-trip. An empty page
/// is a valid outcome, not an error.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T: Serialize> Page<T> {
    /// Build a page from up to `limit + 1` fetched rows.
    pub fn from_overfetch(mut rows: Vec<T>, limit: i64) -> Self {
        let has_more = rows.len() as i64 > limit;
        if has_more {
            rows.truncate(limit as usize);
        }
        Self {
            items: rows,
            has_more,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_fetch_has_no_more() {
        let page = Page::from_overfetch(vec![1, 2], 5);
        assert_eq!(page.items, vec![1, 2]);
        assert!(!page.has_more);
    }

    #[test]
    fn overfetch_is_truncated_and_flagged() {
        let page = Page::from_overfetch(vec![1, 2, 3], 2);
        assert_eq!(page.items, vec![1, 2]);
        assert!(page.has_more);
    }

    #[test]
    fn empty_page_is_valid() {
        let page: Page<i32> = Page::from_overfetch(vec![], 10);
        assert!(page.is_empty());
        assert!(!page.has_more);
    }
}
