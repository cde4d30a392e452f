use std::collections::BTreeMap;

use crate::{ListState, Page, ParamValue, RequestSeq};

/// Intents and lifecycle events consumed by [`crate::update`].
///
/// `T` is the item type produced by the item source, `E` the error type of
/// its fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg<T, E> {
    /// Screen mounted, with the state restored from storage if any.
    Mounted(Option<ListState>),
    /// User edited the search box.
    SearchChanged(String),
    /// User picked a page or a page size.
    PaginationChanged {
        page: Option<u64>,
        items_per_page: Option<u64>,
    },
    /// User clicked a sortable column header.
    SortToggled(String),
    /// Screen replaced its extra filter parameters.
    ParamsChanged(BTreeMap<String, ParamValue>),
    /// Re-fetch the current page, e.g. after a row mutation.
    RefreshRequested,
    /// Item source resolved the fetch issued as `seq`.
    FetchSucceeded { seq: RequestSeq, page: Page<T> },
    /// Item source failed the fetch issued as `seq`.
    FetchFailed { seq: RequestSeq, error: E },
    /// Resource reported that the requested page does not exist (e.g. the
    /// last row of the last page was deleted meanwhile).
    PageMissing { seq: RequestSeq, error: E },
    /// Screen is going away; flush state.
    Unmounted,
}
