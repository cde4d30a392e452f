use items_list_core::ListRequest;

use crate::{FetchError, RawPage, RouteParams};

/// A remote paged collection.
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    async fn query(&self, request: &ListRequest) -> Result<RawPage, FetchError>;
}

/// Per-screen configuration of where items come from and what they become.
#[async_trait::async_trait]
pub trait ItemSource: Send + Sync + 'static {
    type Item: Send + 'static;

    async fn fetch_page(&self, request: &ListRequest) -> Result<RawPage, FetchError>;

    /// Lets the screen inject filters derived from its route, e.g. a named view.
    fn augment_request(&self, request: ListRequest, _route: &RouteParams) -> ListRequest {
        request
    }

    fn transform_item(&self, raw: serde_json::Value) -> Result<Self::Item, FetchError>;
}
