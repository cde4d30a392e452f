use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::ListRequest;
use crate::view_model::{paginator_window, ListViewModel};

/// Fetch sequence number. Only the response matching the latest issued
/// sequence is applied to visible state.
pub type RequestSeq = u64;

/// Value of an extra filter parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Query-string rendering; lists yield one entry per element.
    pub fn to_query_values(&self) -> Vec<String> {
        match self {
            ParamValue::Bool(value) => vec![value.to_string()],
            ParamValue::Int(value) => vec![value.to_string()],
            ParamValue::Text(value) => vec![value.clone()],
            ParamValue::List(values) => values.clone(),
        }
    }
}

/// Persisted UI state of a collection view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListState {
    pub current_page: u64,
    pub items_per_page: u64,
    pub order_by_field: Option<String>,
    pub order_by_reverse: bool,
    pub search_term: String,
    #[serde(default)]
    pub extra_params: BTreeMap<String, ParamValue>,
}

impl Default for ListState {
    fn default() -> Self {
        ListDefaults::default().initial_state()
    }
}

impl ListState {
    /// Compiled sort key: the field name, prefixed with `-` when reversed.
    pub fn order_by(&self) -> Option<String> {
        compile_order_by(self.order_by_field.as_deref(), self.order_by_reverse)
    }

    /// Index (zero-based) of the first item visible on the current page.
    pub fn first_visible_index(&self) -> u64 {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.items_per_page)
    }

    fn sanitized(mut self) -> Self {
        self.current_page = self.current_page.max(1);
        self.items_per_page = self.items_per_page.max(1);
        self
    }
}

/// Builds the `-field` / `field` sort key used on the wire and in locations.
pub fn compile_order_by(field: Option<&str>, reverse: bool) -> Option<String> {
    let field = field.filter(|field| !field.is_empty())?;
    if reverse {
        Some(format!("-{field}"))
    } else {
        Some(field.to_string())
    }
}

/// Inverse of [`compile_order_by`].
pub fn parse_order_by(raw: &str) -> (Option<String>, bool) {
    let raw = raw.trim();
    match raw.strip_prefix('-') {
        Some(field) if !field.is_empty() => (Some(field.to_string()), true),
        Some(_) => (None, false),
        None if raw.is_empty() => (None, false),
        None => (Some(raw.to_string()), false),
    }
}

/// Per-screen defaults used when no stored state exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDefaults {
    pub items_per_page: u64,
    pub order_by_field: Option<String>,
    pub order_by_reverse: bool,
    pub page_size_options: Vec<u64>,
}

impl Default for ListDefaults {
    fn default() -> Self {
        Self {
            items_per_page: 20,
            order_by_field: None,
            order_by_reverse: false,
            page_size_options: vec![5, 10, 20, 50, 100],
        }
    }
}

impl ListDefaults {
    pub fn ordered_by(mut self, field: impl Into<String>, reverse: bool) -> Self {
        self.order_by_field = Some(field.into());
        self.order_by_reverse = reverse;
        self
    }

    pub fn initial_state(&self) -> ListState {
        ListState {
            current_page: 1,
            items_per_page: self.items_per_page.max(1),
            order_by_field: self.order_by_field.clone(),
            order_by_reverse: self.order_by_reverse,
            search_term: String::new(),
            extra_params: BTreeMap::new(),
        }
    }
}

/// One fetched page. Replaced wholesale on every accepted fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items_count: u64,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items_count: 0,
            fetched_at: None,
        }
    }

    pub fn new(items: Vec<T>, total_items_count: u64, fetched_at: DateTime<Utc>) -> Self {
        Self {
            items,
            total_items_count,
            fetched_at: Some(fetched_at),
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Number of pages needed for `total` items, zero when there are none.
pub fn page_count(total: u64, items_per_page: u64) -> u64 {
    total.div_ceil(items_per_page.max(1))
}

/// Controller state: the list state, the current page and fetch bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemsList<T> {
    defaults: ListDefaults,
    state: ListState,
    page: Page<T>,
    is_loaded: bool,
    mounted: bool,
    next_seq: RequestSeq,
    latest_seq: Option<RequestSeq>,
    dirty: bool,
}

impl<T> Default for ItemsList<T> {
    fn default() -> Self {
        Self::new(ListDefaults::default())
    }
}

impl<T> ItemsList<T> {
    pub fn new(defaults: ListDefaults) -> Self {
        let state = defaults.initial_state();
        Self {
            defaults,
            state,
            page: Page::empty(),
            is_loaded: false,
            mounted: false,
            next_seq: 0,
            latest_seq: None,
            dirty: false,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn page(&self) -> &Page<T> {
        &self.page
    }

    pub fn defaults(&self) -> &ListDefaults {
        &self.defaults
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// True once the latest fetch for the current state resolved or failed.
    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn is_empty(&self) -> bool {
        self.is_loaded && self.page.total_items_count == 0
    }

    /// Sequence of the fetch whose response is still awaited, if any.
    pub fn pending_seq(&self) -> Option<RequestSeq> {
        self.latest_seq
    }

    pub fn page_count(&self) -> u64 {
        page_count(self.page.total_items_count, self.state.items_per_page)
    }

    pub fn view(&self) -> ListViewModel<'_, T> {
        let page_count = self.page_count();
        ListViewModel {
            state: &self.state,
            items: &self.page.items,
            total_items_count: self.page.total_items_count,
            page_count,
            pages: paginator_window(page_count, self.state.current_page),
            page_size_options: &self.defaults.page_size_options,
            is_loaded: self.is_loaded,
            is_empty: self.is_empty(),
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn mount(&mut self, stored: Option<ListState>) {
        self.state = stored
            .map(ListState::sanitized)
            .unwrap_or_else(|| self.defaults.initial_state());
        self.page = Page::empty();
        self.is_loaded = false;
        self.mounted = true;
        self.mark_dirty();
    }

    pub(crate) fn unmount(&mut self) {
        self.page = Page::empty();
        self.is_loaded = false;
        self.mounted = false;
        self.latest_seq = None;
        self.mark_dirty();
    }

    pub(crate) fn state_mut(&mut self) -> &mut ListState {
        &mut self.state
    }

    /// Called after an intent changed the list state: the visible page no
    /// longer matches it until the next fetch resolves.
    pub(crate) fn invalidate(&mut self) {
        self.is_loaded = false;
        self.mark_dirty();
    }

    /// Allocates the next sequence number and marks it as the only
    /// acceptable response.
    pub(crate) fn issue_request(&mut self) -> (RequestSeq, ListRequest) {
        self.next_seq += 1;
        self.latest_seq = Some(self.next_seq);
        (self.next_seq, ListRequest::from_state(&self.state))
    }

    /// Consumes the pending sequence if `seq` is the latest one.
    pub(crate) fn accept_response(&mut self, seq: RequestSeq) -> bool {
        if self.latest_seq == Some(seq) {
            self.latest_seq = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn replace_page(&mut self, page: Page<T>) {
        self.page = page;
        self.is_loaded = true;
        self.mark_dirty();
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.is_loaded = true;
        self.mark_dirty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_by_round_trips() {
        assert_eq!(compile_order_by(Some("name"), true).as_deref(), Some("-name"));
        assert_eq!(parse_order_by("-name"), (Some("name".to_string()), true));
        assert_eq!(parse_order_by("name"), (Some("name".to_string()), false));
        assert_eq!(parse_order_by("-"), (None, false));
        assert_eq!(compile_order_by(None, true), None);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(21, 10), 3);
        assert_eq!(page_count(20, 10), 2);
    }
}
