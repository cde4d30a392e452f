//! Users screen: a paged list of user accounts with per-row actions.
mod actions;
mod columns;
mod model;
mod source;

pub use actions::{
    action_for, perform_row_action, row_click_target, ReqwestUserApi, RowAction, RowEvent,
};
pub use columns::USER_COLUMNS;
pub use model::User;
pub use source::UsersItemSource;

use items_list_core::ListDefaults;

use crate::registry::{MenuEntry, Registry, Route};

/// Newest accounts first unless the location says otherwise.
pub fn list_defaults() -> ListDefaults {
    ListDefaults::default().ordered_by("created_at", true)
}

fn is_users_path(path: &str) -> bool {
    path.starts_with("/users") && path != "/users/me"
}

/// Registers the settings-menu entry and the routes of the users screen.
pub fn init(registry: &mut Registry) {
    registry.add_menu_entry(MenuEntry {
        permission: "list_users",
        title: "Users",
        path: "users",
        order: 2,
        is_active: is_users_path,
    });
    registry.add_routes([
        Route {
            path: "/users",
            title: "Active Users",
            key: "active",
        },
        Route {
            path: "/users/pending",
            title: "Pending Invitations",
            key: "pending",
        },
        Route {
            path: "/users/disabled",
            title: "Disabled Users",
            key: "disabled",
        },
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_registers_menu_entry_and_routes() {
        let mut registry = Registry::new();
        init(&mut registry);

        let menu = registry.menu(&["list_users"]);
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].path, "users");
        assert!(menu[0].is_active("/users/pending"));
        assert!(menu[0].is_active("/users/42"));
        assert!(!menu[0].is_active("/users/me"));
        assert!(!menu[0].is_active("/groups"));

        let keys: Vec<_> = registry.routes().iter().map(|route| route.key).collect();
        assert_eq!(keys, vec!["active", "pending", "disabled"]);
        assert_eq!(registry.resolve("/users/disabled").map(|r| r.title), Some("Disabled Users"));
    }

    #[test]
    fn defaults_sort_newest_first() {
        let state = list_defaults().initial_state();
        assert_eq!(state.order_by().as_deref(), Some("-created_at"));
    }
}
