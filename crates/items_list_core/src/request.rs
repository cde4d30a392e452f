use std::collections::BTreeMap;

use crate::state::{ListState, ParamValue};

/// Request for one page, built from the list state before it is handed to
/// the item source's augmentation hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub page: u64,
    pub page_size: u64,
    pub order: Option<String>,
    pub q: Option<String>,
    pub params: BTreeMap<String, ParamValue>,
}

impl ListRequest {
    pub fn from_state(state: &ListState) -> Self {
        Self {
            page: state.current_page,
            page_size: state.items_per_page,
            order: state.order_by(),
            q: Some(state.search_term.clone()).filter(|term| !term.is_empty()),
            params: state.extra_params.clone(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Flattens the request into ordered query pairs: paging and sorting
    /// first, then parameters in key order with list values repeated.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
        ];
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(q) = &self.q {
            pairs.push(("q".to_string(), q.clone()));
        }
        for (key, value) in &self.params {
            for rendered in value.to_query_values() {
                pairs.push((key.clone(), rendered));
            }
        }
        pairs
    }
}
