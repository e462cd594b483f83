use rayon::prelude::*;
use tracing::trace;

use crate::store::{Record, RecordStore};

pub const ROWS_PER_PAGE_STEPS: [usize; 4] = [10, 20, 50, 100];

/// Transient view parameters. Lives for the session, unlike the column
/// preferences which are persisted across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    search: String,
    page: usize, // 1-based
    rows_per_page: usize,
}

impl ViewState {
    pub fn new(rows_per_page: usize) -> Self {
        ViewState {
            search: String::new(),
            page: 1,
            rows_per_page: rows_per_page.max(1),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Changing the search text always snaps back to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.rows_per_page = rows_per_page.max(1);
        self.page = 1;
    }

    pub fn cycle_rows_per_page(&mut self) {
        let next = ROWS_PER_PAGE_STEPS
            .iter()
            .position(|&s| s == self.rows_per_page)
            .map(|i| ROWS_PER_PAGE_STEPS[(i + 1) % ROWS_PER_PAGE_STEPS.len()])
            .unwrap_or(ROWS_PER_PAGE_STEPS[0]);
        self.set_rows_per_page(next);
    }

    pub fn total_pages(&self, total_matching: usize) -> usize {
        total_matching.div_ceil(self.rows_per_page).max(1)
    }

    pub fn next_page(&mut self, total_matching: usize) {
        if self.page < self.total_pages(total_matching) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        if self.page > 1 {
            self.page -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn last_page(&mut self, total_matching: usize) {
        self.page = self.total_pages(total_matching);
    }

    /// Keeps the page inside bounds after the matching set shrank
    /// (e.g. the store was replaced or the filter narrowed).
    pub fn clamp_page(&mut self, total_matching: usize) {
        self.page = self.page.clamp(1, self.total_pages(total_matching));
    }
}

/// Derives the currently visible page from the store without mutating it.
///
/// Returns the records of the requested page plus the total number of
/// matching records. Callers must have synchronized pending edits into the
/// store before paging, the projection itself is a pure function.
pub fn project<'a>(
    store: &'a RecordStore,
    search: &str,
    page: usize,
    rows_per_page: usize,
) -> (Vec<&'a Record>, usize) {
    let matching: Vec<&Record> = if search.is_empty() {
        store.records().iter().collect()
    } else {
        let needle = search.to_lowercase();
        store
            .records()
            .par_iter()
            .filter(|record| record.matches(&needle))
            .collect()
    };

    let total = matching.len();
    let rows_per_page = rows_per_page.max(1);
    let start = (page.max(1) - 1).saturating_mul(rows_per_page).min(total);
    let end = (start + rows_per_page).min(total);
    trace!(
        "Projected page {} ({}..{}) of {} matching records",
        page, start, end, total
    );
    (matching[start..end].to_vec(), total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_store(n: usize) -> RecordStore {
        RecordStore::from_rows(
            (0..n)
                .map(|i| vec![("Name".to_string(), format!("row{i:03}"))])
                .collect(),
        )
    }

    #[test]
    fn empty_search_returns_first_page_in_store_order() {
        let store = numbered_store(45);
        let (page, total) = project(&store, "", 1, 20);
        assert_eq!(total, 45);
        assert_eq!(page.len(), 20);
        assert_eq!(page[0].get("Name"), Some("row000"));
        assert_eq!(page[19].get("Name"), Some("row019"));
    }

    #[test]
    fn last_page_is_clamped_to_bounds() {
        let store = numbered_store(45);
        let (page, _) = project(&store, "", 3, 20);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].get("Name"), Some("row040"));

        // Beyond the last page yields an empty slice rather than a fault.
        let (page, total) = project(&store, "", 9, 20);
        assert!(page.is_empty());
        assert_eq!(total, 45);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let store = RecordStore::from_rows(vec![
            vec![("City".to_string(), "New York".to_string())],
            vec![("City".to_string(), "Boston".to_string())],
            vec![("City".to_string(), "Newark".to_string())],
        ]);
        let (page, total) = project(&store, "new", 1, 20);
        assert_eq!(total, 2);
        assert_eq!(page[0].get("City"), Some("New York"));
        assert_eq!(page[1].get("City"), Some("Newark"));
    }

    #[test]
    fn setting_search_resets_page() {
        let mut view = ViewState::new(20);
        view.next_page(100);
        view.next_page(100);
        assert_eq!(view.page(), 3);
        view.set_search("x");
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn paging_is_bounded() {
        let mut view = ViewState::new(20);
        view.prev_page();
        assert_eq!(view.page(), 1);
        view.next_page(30);
        view.next_page(30);
        assert_eq!(view.page(), 2);
        view.last_page(0);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn cycle_rows_per_page_steps_and_resets_page() {
        let mut view = ViewState::new(20);
        view.next_page(100);
        view.cycle_rows_per_page();
        assert_eq!(view.rows_per_page(), 50);
        assert_eq!(view.page(), 1);
        view.cycle_rows_per_page();
        view.cycle_rows_per_page();
        assert_eq!(view.rows_per_page(), 10);
    }
}
