//! Decoded page results and pagination metadata.

use crate::dataset::Record;
use serde::Serialize;

/// Pagination metadata for one page.
///
/// `showing_start` and `showing_end` are 1-based and inclusive; both are 0
/// for an empty page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total_items: u64,
    pub total_pages: u64,
    pub showing_start: u64,
    pub showing_end: u64,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    /// Computes pagination from totals when the payload carries none.
    pub fn from_totals(page: u32, limit: u32, total_items: u64, row_count: usize) -> Self {
        let page = u64::from(page.max(1));
        let limit = u64::from(limit.max(1));
        let total_pages = total_items.div_ceil(limit);

        let (showing_start, showing_end) = if row_count == 0 {
            (0, 0)
        } else {
            let start = (page - 1) * limit + 1;
            (start, start + row_count as u64 - 1)
        };

        Self {
            total_items,
            total_pages,
            showing_start,
            showing_end,
            has_prev: page > 1,
            has_next: page < total_pages,
        }
    }
}

/// One decoded page of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PageResult {
    pub rows: Vec<Record>,
    pub pagination: Pagination,
}

impl PageResult {
    /// Builds a page by slicing already-decoded records in memory.
    pub fn slice(records: &[Record], page: u32, limit: u32) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let start = (page as usize - 1).saturating_mul(limit as usize);
        let rows: Vec<Record> = records
            .iter()
            .skip(start)
            .take(limit as usize)
            .cloned()
            .collect();
        let pagination = Pagination::from_totals(page, limit, records.len() as u64, rows.len());
        Self { rows, pagination }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: i64) -> Vec<Record> {
        (0..n).map(|i| Record::new().with("id", i)).collect()
    }

    #[test]
    fn test_first_page() {
        let p = Pagination::from_totals(1, 100, 250, 100);
        assert_eq!(p.total_pages, 3);
        assert_eq!((p.showing_start, p.showing_end), (1, 100));
        assert!(!p.has_prev);
        assert!(p.has_next);
    }

    #[test]
    fn test_last_partial_page() {
        let p = Pagination::from_totals(3, 100, 250, 50);
        assert_eq!((p.showing_start, p.showing_end), (201, 250));
        assert!(p.has_prev);
        assert!(!p.has_next);
    }

    #[test]
    fn test_empty_dataset() {
        let p = Pagination::from_totals(1, 100, 0, 0);
        assert_eq!(p.total_pages, 0);
        assert_eq!((p.showing_start, p.showing_end), (0, 0));
        assert!(!p.has_prev && !p.has_next);
    }

    #[test]
    fn test_slice_middle_page() {
        let page = PageResult::slice(&records(25), 2, 10);
        assert_eq!(page.rows.len(), 10);
        assert_eq!(
            page.rows[0].get("id"),
            Some(&crate::dataset::Value::Integer(10))
        );
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.showing_start, 11);
    }

    #[test]
    fn test_slice_past_end_is_empty() {
        let page = PageResult::slice(&records(5), 4, 10);
        assert!(page.rows.is_empty());
        assert_eq!(page.pagination.total_items, 5);
        assert!(page.pagination.has_prev);
    }
}
