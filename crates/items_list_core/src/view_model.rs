use crate::ListState;

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListViewModel<'a, T> {
    pub state: &'a ListState,
    pub items: &'a [T],
    pub total_items_count: u64,
    pub page_count: u64,
    /// Paginator buttons; `None` marks a gap.
    pub pages: Vec<Option<u64>>,
    pub page_size_options: &'a [u64],
    pub is_loaded: bool,
    pub is_empty: bool,
}

const LEFT_EDGE: u64 = 2;
const LEFT_CURRENT: u64 = 2;
const RIGHT_CURRENT: u64 = 4;
const RIGHT_EDGE: u64 = 2;

/// Page numbers shown by a paginator: the edges, a window around the current
/// page, and `None` wherever pages are skipped.
pub fn paginator_window(page_count: u64, current_page: u64) -> Vec<Option<u64>> {
    let last_page = page_count;
    if last_page == 0 {
        return Vec::new();
    }

    // A stale or hand-edited page number may lie past the end.
    let current_page = current_page.clamp(1, last_page);
    let mut pages = Vec::new();

    let left_end = (1 + LEFT_EDGE).min(last_page.saturating_add(1));
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(LEFT_CURRENT));
    let mid_end = current_page
        .saturating_add(RIGHT_CURRENT + 1)
        .min(last_page.saturating_add(1));
    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(RIGHT_EDGE) + 1);
    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}
