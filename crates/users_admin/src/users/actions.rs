use items_list_engine::{ItemSource, ListController, ResourceSettings, StateStorage};
use panel_logging::{panel_info, panel_warn};
use thiserror::Error;
use url::Url;

use super::model::User;

#[derive(Debug, Error)]
pub enum MutationError {
    #[error("invalid api url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Enable,
    Disable,
    Delete,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            RowAction::Enable => "Enable",
            RowAction::Disable => "Disable",
            RowAction::Delete => "Delete",
        }
    }

    /// Parses a label case-insensitively, e.g. `disable`.
    pub fn from_label(label: &str) -> Option<Self> {
        [RowAction::Enable, RowAction::Disable, RowAction::Delete]
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(label))
    }
}

/// The one action offered on a user's row, if any.
pub fn action_for(user: &User, current_user_id: Option<i64>) -> Option<RowAction> {
    if Some(user.id) == current_user_id {
        return None;
    }
    if user.is_invitation_pending {
        return Some(RowAction::Delete);
    }
    if user.is_disabled {
        Some(RowAction::Enable)
    } else {
        Some(RowAction::Disable)
    }
}

/// UI event that originated a row interaction. An action button sits inside
/// a clickable row, so it must keep the click from reaching the row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowEvent {
    default_prevented: bool,
    propagation_stopped: bool,
}

impl RowEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Where a row click navigates, unless an action button swallowed it.
pub fn row_click_target(event: &RowEvent, user: &User) -> Option<String> {
    if event.is_default_prevented() || event.is_propagation_stopped() {
        None
    } else {
        Some(user.detail_path())
    }
}

#[async_trait::async_trait]
pub trait UserApi: Send + Sync {
    async fn enable_user(&self, user: &User) -> Result<(), MutationError>;
    async fn disable_user(&self, user: &User) -> Result<(), MutationError>;
    async fn delete_user(&self, user: &User) -> Result<(), MutationError>;
}

/// Runs a row action: swallows the event, performs the mutation and, once it
/// succeeded, refreshes the current page. Failures go back to the caller.
pub async fn perform_row_action<S, St>(
    event: &mut RowEvent,
    action: RowAction,
    user: &User,
    api: &dyn UserApi,
    controller: &mut ListController<S, St>,
) -> Result<(), MutationError>
where
    S: ItemSource,
    St: StateStorage,
{
    event.prevent_default();
    event.stop_propagation();

    let result = match action {
        RowAction::Enable => api.enable_user(user).await,
        RowAction::Disable => api.disable_user(user).await,
        RowAction::Delete => api.delete_user(user).await,
    };
    if let Err(err) = &result {
        panel_warn!("{} failed for user {}: {}", action.label(), user.id, err);
        return result;
    }

    panel_info!("{} succeeded for user {}", action.label(), user.id);
    controller.update();
    Ok(())
}

/// User mutations against the admin HTTP API.
#[derive(Debug, Clone)]
pub struct ReqwestUserApi {
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestUserApi {
    /// `settings.base_url` is the API root, e.g. `http://localhost:5000/api`.
    /// Timeouts are the same ones the list resource uses.
    pub fn new(settings: &ResourceSettings) -> Result<Self, MutationError> {
        let mut base_url = Url::parse(&settings.base_url)
            .map_err(|err| MutationError::InvalidUrl(err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| MutationError::Network(err.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn user_url(&self, user: &User, suffix: &str) -> Result<Url, MutationError> {
        self.base_url
            .join(&format!("users/{}{}", user.id, suffix))
            .map_err(|err| MutationError::InvalidUrl(err.to_string()))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(), MutationError> {
        let response = request
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    MutationError::Timeout(err.to_string())
                } else {
                    MutationError::Network(err.to_string())
                }
            })?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(MutationError::HttpStatus(status.as_u16()))
        }
    }
}

#[async_trait::async_trait]
impl UserApi for ReqwestUserApi {
    async fn enable_user(&self, user: &User) -> Result<(), MutationError> {
        let url = self.user_url(user, "/disable")?;
        self.send(self.client.delete(url.as_str())).await
    }

    async fn disable_user(&self, user: &User) -> Result<(), MutationError> {
        let url = self.user_url(user, "/disable")?;
        self.send(self.client.post(url.as_str())).await
    }

    async fn delete_user(&self, user: &User) -> Result<(), MutationError> {
        let url = self.user_url(user, "")?;
        self.send(self.client.delete(url.as_str())).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use items_list_core::ListRequest;
    use items_list_engine::{FetchError, MemoryStateStorage, RawPage, Resource, UrlStateStorage};
    use serde_json::json;
    use tokio::runtime::Handle;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::users::{list_defaults, UsersItemSource};

    fn user(id: i64) -> User {
        User {
            id,
            name: format!("User {id}"),
            email: format!("user{id}@example.com"),
            groups: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            active_at: None,
            is_disabled: false,
            is_invitation_pending: false,
        }
    }

    #[test]
    fn action_depends_on_account_status() {
        let active = user(2);
        let disabled = User {
            is_disabled: true,
            ..user(3)
        };
        let pending = User {
            is_invitation_pending: true,
            is_disabled: true,
            ..user(4)
        };

        assert_eq!(action_for(&active, Some(1)), Some(RowAction::Disable));
        assert_eq!(action_for(&disabled, Some(1)), Some(RowAction::Enable));
        assert_eq!(action_for(&pending, Some(1)), Some(RowAction::Delete));
        assert_eq!(action_for(&active, Some(2)), None);
        assert_eq!(action_for(&active, None), Some(RowAction::Disable));
    }

    #[test]
    fn labels_parse_back() {
        assert_eq!(RowAction::from_label("disable"), Some(RowAction::Disable));
        assert_eq!(RowAction::from_label("DELETE"), Some(RowAction::Delete));
        assert_eq!(RowAction::from_label("ban"), None);
    }

    #[test]
    fn swallowed_event_does_not_navigate() {
        let mut event = RowEvent::new();
        assert_eq!(row_click_target(&event, &user(9)).as_deref(), Some("users/9"));
        event.stop_propagation();
        assert_eq!(row_click_target(&event, &user(9)), None);
    }

    /// Serves a fixed page and counts queries.
    #[derive(Clone, Default)]
    struct CountingResource {
        queries: Arc<Mutex<Vec<u64>>>,
    }

    #[async_trait::async_trait]
    impl Resource for CountingResource {
        async fn query(&self, request: &ListRequest) -> Result<RawPage, FetchError> {
            self.queries.lock().unwrap().push(request.page);
            Ok(RawPage {
                count: 1,
                results: vec![json!({
                    "id": 2,
                    "name": "Bob",
                    "email": "bob@example.com",
                    "created_at": "2024-01-01T00:00:00Z",
                })],
            })
        }
    }

    struct FailingApi;

    #[async_trait::async_trait]
    impl UserApi for FailingApi {
        async fn enable_user(&self, _user: &User) -> Result<(), MutationError> {
            Err(MutationError::HttpStatus(403))
        }
        async fn disable_user(&self, _user: &User) -> Result<(), MutationError> {
            Err(MutationError::HttpStatus(403))
        }
        async fn delete_user(&self, _user: &User) -> Result<(), MutationError> {
            Err(MutationError::HttpStatus(403))
        }
    }

    #[tokio::test]
    async fn successful_action_refreshes_current_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/2/disable"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let resource = CountingResource::default();
        let mut controller = ListController::new(
            Handle::current(),
            UsersItemSource::new(resource.clone()),
            MemoryStateStorage::default(),
            list_defaults(),
        );
        controller.mount();
        controller.settle().await;

        let settings = ResourceSettings::new(format!("{}/api", server.uri()));
        let api = ReqwestUserApi::new(&settings).unwrap();
        let target = controller.view().items[0].clone();
        let mut event = RowEvent::new();
        perform_row_action(&mut event, RowAction::Disable, &target, &api, &mut controller)
            .await
            .expect("disable ok");
        controller.settle().await;

        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert_eq!(resource.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_action_propagates_and_skips_refresh() {
        let resource = CountingResource::default();
        let location = url::Url::parse("http://panel.local/users").unwrap();
        let mut controller = ListController::new(
            Handle::current(),
            UsersItemSource::new(resource.clone()),
            UrlStateStorage::new(location, list_defaults()),
            list_defaults(),
        );
        controller.mount();
        controller.settle().await;

        let mut event = RowEvent::new();
        let target = user(2);
        let err = perform_row_action(
            &mut event,
            RowAction::Enable,
            &target,
            &FailingApi,
            &mut controller,
        )
        .await
        .unwrap_err();
        controller.pump();

        assert!(matches!(err, MutationError::HttpStatus(403)));
        assert!(event.is_default_prevented());
        assert_eq!(resource.queries.lock().unwrap().len(), 1);
        assert!(controller.list().pending_seq().is_none());
    }

    #[tokio::test]
    async fn api_maps_actions_to_endpoints() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/5/disable"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/5"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let settings = ResourceSettings::new(format!("{}/api/", server.uri()));
        let api = ReqwestUserApi::new(&settings).unwrap();
        api.enable_user(&user(5)).await.expect("enable ok");
        let err = api.delete_user(&user(5)).await.unwrap_err();
        assert!(matches!(err, MutationError::HttpStatus(404)));
    }

    #[tokio::test]
    async fn stalled_mutation_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users/5/disable"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let settings = ResourceSettings {
            request_timeout: Duration::from_millis(100),
            ..ResourceSettings::new(format!("{}/api", server.uri()))
        };
        let api = ReqwestUserApi::new(&settings).unwrap();
        let err = api.disable_user(&user(5)).await.unwrap_err();
        assert!(matches!(err, MutationError::Timeout(_)));
    }

    #[test]
    fn bad_api_url_is_rejected() {
        assert!(matches!(
            ReqwestUserApi::new(&ResourceSettings::new("::nope")),
            Err(MutationError::InvalidUrl(_))
        ));
    }
}
