use items_list_core::{ListRequest, ParamValue};
use items_list_engine::{FailureKind, FetchError, ItemSource, RawPage, Resource, RouteParams};

use super::model::User;
use crate::registry::VIEW_PARAM;

/// Users collection: the shared paged resource plus the screen's named views.
pub struct UsersItemSource<R> {
    resource: R,
}

impl<R: Resource> UsersItemSource<R> {
    pub fn new(resource: R) -> Self {
        Self { resource }
    }
}

#[async_trait::async_trait]
impl<R: Resource + 'static> ItemSource for UsersItemSource<R> {
    type Item = User;

    async fn fetch_page(&self, request: &ListRequest) -> Result<RawPage, FetchError> {
        self.resource.query(request).await
    }

    fn augment_request(&self, request: ListRequest, route: &RouteParams) -> ListRequest {
        match route.get(VIEW_PARAM).map(String::as_str) {
            Some("active") => request.with_param("pending", ParamValue::Bool(false)),
            Some("pending") => request.with_param("pending", ParamValue::Bool(true)),
            Some("disabled") => request.with_param("disabled", ParamValue::Bool(true)),
            _ => request,
        }
    }

    fn transform_item(&self, raw: serde_json::Value) -> Result<User, FetchError> {
        serde_json::from_value(raw)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}
