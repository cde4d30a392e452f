use chrono::{DateTime, Utc};
use items_list_core::ListViewModel;

use crate::registry::{MenuEntry, Route};
use crate::users::{action_for, User, USER_COLUMNS};

/// Settings menu line; the entry active for `path` is bracketed.
pub fn render_menu(entries: &[&MenuEntry], path: &str) -> String {
    let titles: Vec<String> = entries
        .iter()
        .map(|entry| {
            if entry.is_active(path) {
                format!("[{}]", entry.title)
            } else {
                entry.title.to_string()
            }
        })
        .collect();
    format!("Settings: {}", titles.join(" "))
}

/// View switcher line; the view whose key matches `current_key` is bracketed.
pub fn render_views(routes: &[Route], current_key: &str) -> String {
    let titles: Vec<String> = routes
        .iter()
        .map(|route| {
            if route.key == current_key {
                format!("[{}]", route.title)
            } else {
                route.title.to_string()
            }
        })
        .collect();
    format!("Views: {}", titles.join(" | "))
}

/// Renders the users list as text lines: a loading or empty notice, or the
/// table followed by the paginator.
pub fn render(
    view: &ListViewModel<'_, User>,
    current_user_id: Option<i64>,
    now: DateTime<Utc>,
) -> Vec<String> {
    if !view.is_loaded {
        return vec!["Loading...".to_string()];
    }
    if view.is_empty {
        return vec!["No users found.".to_string()];
    }

    let mut lines = Vec::with_capacity(view.items.len() + 3);

    let header: Vec<String> = USER_COLUMNS
        .iter()
        .map(|column| {
            let marker = match view.state.order_by_field.as_deref() {
                Some(field) if field == column.field && view.state.order_by_reverse => " v",
                Some(field) if field == column.field => " ^",
                _ => "",
            };
            format!("{}{}", column.title, marker)
        })
        .collect();
    lines.push(header.join(" | "));

    for user in view.items {
        let mut cells: Vec<String> = USER_COLUMNS
            .iter()
            .map(|column| (column.cell)(user, now))
            .collect();
        if let Some(action) = action_for(user, current_user_id) {
            cells.push(format!("[{}]", action.label()));
        }
        lines.push(cells.join(" | "));
    }

    let pages: Vec<String> = view
        .pages
        .iter()
        .map(|page| match page {
            Some(page) if *page == view.state.current_page => format!("[{page}]"),
            Some(page) => page.to_string(),
            None => "...".to_string(),
        })
        .collect();
    lines.push(format!(
        "Pages: {} (page {} of {}, {} users)",
        pages.join(" "),
        view.state.current_page,
        view.page_count,
        view.total_items_count
    ));

    lines
}
