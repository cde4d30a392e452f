use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use items_list_engine::{ListController, ReqwestResource, ResourceSettings, UrlStateStorage};
use panel_logging::{panel_debug, panel_error, panel_info};
use tokio::runtime::Handle;
use url::Url;

use super::logging::{self, LogDestination};
use super::ui::render;
use crate::registry::Registry;
use crate::users::{
    self, action_for, perform_row_action, row_click_target, ReqwestUserApi, RowAction, RowEvent,
    UsersItemSource,
};

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_PANEL_URL: &str = "http://localhost:5000/";
const DEFAULT_LOCATION: &str = "/users";
const DEFAULT_PERMISSIONS: &str = "list_users";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    /// API root; the users collection lives at `{api_url}/users`.
    pub api_url: String,
    /// Origin the panel locations are resolved against.
    pub panel_url: String,
    pub current_user_id: Option<i64>,
    pub permissions: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            panel_url: DEFAULT_PANEL_URL.to_string(),
            current_user_id: None,
            permissions: parse_permissions(DEFAULT_PERMISSIONS),
        }
    }
}

impl AppSettings {
    /// Overrides defaults from `USERS_ADMIN_API`, `USERS_ADMIN_PANEL`,
    /// `USERS_ADMIN_CURRENT_USER` and `USERS_ADMIN_PERMISSIONS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("USERS_ADMIN_API").unwrap_or(defaults.api_url),
            panel_url: std::env::var("USERS_ADMIN_PANEL").unwrap_or(defaults.panel_url),
            current_user_id: std::env::var("USERS_ADMIN_CURRENT_USER")
                .ok()
                .and_then(|id| id.parse().ok()),
            permissions: std::env::var("USERS_ADMIN_PERMISSIONS")
                .map(|list| parse_permissions(&list))
                .unwrap_or(defaults.permissions),
        }
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.api_url.trim_end_matches('/'))
    }
}

fn parse_permissions(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|permission| !permission.is_empty())
        .map(str::to_string)
        .collect()
}

/// A row action requested on the command line, e.g. `disable 42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCommand {
    pub action: RowAction,
    pub user_id: i64,
}

impl RowCommand {
    pub fn parse(action: &str, user_id: &str) -> anyhow::Result<Self> {
        let action =
            RowAction::from_label(action).ok_or_else(|| anyhow!("unknown action '{action}'"))?;
        let user_id = user_id
            .parse::<i64>()
            .with_context(|| format!("invalid user id '{user_id}'"))?;
        Ok(Self { action, user_id })
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

/// Mounts the users screen at `location` (e.g. `/users/pending?page=2`),
/// prints it, optionally runs one row action, and returns the location the
/// screen left behind.
pub async fn run_app(
    settings: AppSettings,
    location: Option<String>,
    command: Option<RowCommand>,
) -> anyhow::Result<Url> {
    logging::initialize(LogDestination::from_env());

    let mut registry = Registry::new();
    users::init(&mut registry);

    let location = Url::parse(&settings.panel_url)
        .and_then(|origin| origin.join(location.as_deref().unwrap_or(DEFAULT_LOCATION)))
        .context("invalid panel location")?;
    let route = registry
        .resolve(location.path())
        .ok_or_else(|| anyhow!("no screen registered for {}", location.path()))?;
    panel_info!("Opening {} ({})", route.title, location);

    let permissions: Vec<&str> = settings.permissions.iter().map(String::as_str).collect();
    println!(
        "{}",
        render::render_menu(&registry.menu(&permissions), location.path())
    );
    println!("{}", render::render_views(registry.routes(), route.key));

    let resource = ReqwestResource::new(ResourceSettings::new(settings.users_url()))?;
    let storage = UrlStateStorage::new(location, users::list_defaults());
    let mut controller = ListController::new(
        Handle::current(),
        UsersItemSource::new(resource),
        storage,
        users::list_defaults(),
    )
    .with_route_params(route.params())
    .with_error_handler(|err| panel_error!("Failed to load users: {}", err));

    controller.mount();
    controller.settle().await;
    print_lines(render::render(
        &controller.view(),
        settings.current_user_id,
        Utc::now(),
    ));

    if let Some(RowCommand { action, user_id }) = command {
        let user = controller
            .view()
            .items
            .iter()
            .find(|user| user.id == user_id)
            .cloned()
            .ok_or_else(|| anyhow!("user {user_id} is not on the current page"))?;
        if action_for(&user, settings.current_user_id) != Some(action) {
            bail!("{} is not available for user {}", action.label(), user_id);
        }

        let api = ReqwestUserApi::new(&ResourceSettings::new(settings.api_url.clone()))?;
        let mut event = RowEvent::new();
        perform_row_action(&mut event, action, &user, &api, &mut controller).await?;
        match row_click_target(&event, &user) {
            Some(target) => panel_info!("Row click opens {}", target),
            None => panel_debug!("Row click swallowed by {}", action.label()),
        }

        controller.settle().await;
        print_lines(render::render(
            &controller.view(),
            settings.current_user_id,
            Utc::now(),
        ));
    }

    let location = controller.unmount().into_location();
    panel_info!("Closed users screen at {}", location);
    Ok(location)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings_for(server: &MockServer) -> AppSettings {
        AppSettings {
            api_url: format!("{}/api", server.uri()),
            panel_url: "http://panel.local/".to_string(),
            current_user_id: Some(1),
            permissions: vec!["list_users".to_string()],
        }
    }

    fn user_record(id: i64, is_invitation_pending: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("User {id}"),
            "email": format!("user{id}@example.com"),
            "created_at": "2024-01-01T00:00:00Z",
            "is_invitation_pending": is_invitation_pending,
        })
    }

    #[test]
    fn users_url_joins_api_root() {
        let settings = AppSettings {
            api_url: "http://api.local/api/".to_string(),
            ..AppSettings::default()
        };
        assert_eq!(settings.users_url(), "http://api.local/api/users");
    }

    #[test]
    fn permissions_and_commands_parse() {
        assert_eq!(parse_permissions(" a, ,b "), vec!["a", "b"]);
        assert_eq!(
            RowCommand::parse("Disable", "7").unwrap(),
            RowCommand {
                action: RowAction::Disable,
                user_id: 7
            }
        );
        assert!(RowCommand::parse("ban", "7").is_err());
        assert!(RowCommand::parse("delete", "x").is_err());
    }

    #[tokio::test]
    async fn pending_view_loads_and_rewrites_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .and(query_param("pending", "true"))
            .and(query_param("page", "2"))
            .and(query_param("order", "-created_at"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 21,
                "results": [user_record(21, true)],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let location = run_app(
            settings_for(&server),
            Some("/users/pending?page=2".to_string()),
            None,
        )
        .await
        .expect("run ok");

        assert_eq!(location.path(), "/users/pending");
        assert_eq!(
            location.query(),
            Some("page=2&page_size=20&order=-created_at")
        );
    }

    #[tokio::test]
    async fn row_command_mutates_and_refreshes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [user_record(5, true)],
            })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/users/5"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let command = RowCommand {
            action: RowAction::Delete,
            user_id: 5,
        };
        run_app(settings_for(&server), None, Some(command))
            .await
            .expect("run ok");
    }

    #[tokio::test]
    async fn unavailable_row_command_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "results": [user_record(5, false)],
            })))
            .mount(&server)
            .await;

        let command = RowCommand {
            action: RowAction::Enable,
            user_id: 5,
        };
        let err = run_app(settings_for(&server), None, Some(command))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Enable is not available"));
    }

    #[tokio::test]
    async fn unknown_location_is_an_error() {
        let err = run_app(AppSettings::default(), Some("/groups".to_string()), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/groups"));
    }
}
