//! Navigation registry: settings-menu entries and routes contributed by
//! screens through explicit `init` calls.

use items_list_engine::RouteParams;

/// Route parameter carrying the key of the matched route.
pub const VIEW_PARAM: &str = "currentPage";

#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub permission: &'static str,
    pub title: &'static str,
    pub path: &'static str,
    pub order: u32,
    pub is_active: fn(&str) -> bool,
}

impl MenuEntry {
    pub fn is_active(&self, path: &str) -> bool {
        (self.is_active)(path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub title: &'static str,
    pub key: &'static str,
}

impl Route {
    pub fn params(&self) -> RouteParams {
        RouteParams::from([(VIEW_PARAM.to_string(), self.key.to_string())])
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    menu: Vec<MenuEntry>,
    routes: Vec<Route>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_menu_entry(&mut self, entry: MenuEntry) {
        self.menu.push(entry);
    }

    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) {
        self.routes.extend(routes);
    }

    /// Menu entries the holder of `permissions` may see, in menu order.
    pub fn menu(&self, permissions: &[&str]) -> Vec<&MenuEntry> {
        let mut entries: Vec<_> = self
            .menu
            .iter()
            .filter(|entry| permissions.contains(&entry.permission))
            .collect();
        entries.sort_by_key(|entry| entry.order);
        entries
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Route registered for `path`, ignoring a trailing slash.
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        self.routes.iter().find(|route| route.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &str) -> bool {
        true
    }

    #[test]
    fn menu_is_filtered_and_ordered() {
        let mut registry = Registry::new();
        let entries = [
            ("admin", "Settings", 5),
            ("list_users", "Users", 2),
            ("admin", "Groups", 1),
        ];
        for (permission, title, order) in entries {
            registry.add_menu_entry(MenuEntry {
                permission,
                title,
                path: "x",
                order,
                is_active: always,
            });
        }

        let titles: Vec<_> = registry.menu(&["admin"]).iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Groups", "Settings"]);
        assert!(registry.menu(&[]).is_empty());
    }

    #[test]
    fn resolve_ignores_trailing_slash() {
        let mut registry = Registry::new();
        registry.add_routes([Route {
            path: "/users/pending",
            title: "Pending Invitations",
            key: "pending",
        }]);

        assert_eq!(registry.resolve("/users/pending/").map(|r| r.key), Some("pending"));
        assert!(registry.resolve("/users/pending/x").is_none());
        assert_eq!(
            registry.routes()[0].params().get(VIEW_PARAM).map(String::as_str),
            Some("pending")
        );
    }
}
