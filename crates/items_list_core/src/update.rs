use crate::state::page_count;
use crate::{Effect, ItemsList, Msg};

/// Pure update function: applies a message to the list and returns any effects.
pub fn update<T, E>(mut list: ItemsList<T>, msg: Msg<T, E>) -> (ItemsList<T>, Vec<Effect<E>>) {
    if !list.is_mounted() && !matches!(msg, Msg::Mounted(_)) {
        // Fetch results that outlive the screen land here too.
        return (list, Vec::new());
    }

    let effects = match msg {
        Msg::Mounted(stored) => {
            list.mount(stored);
            vec![fetch(&mut list)]
        }
        Msg::SearchChanged(term) => {
            if list.state().search_term == term {
                return (list, Vec::new());
            }
            let state = list.state_mut();
            state.search_term = term;
            state.current_page = 1;
            commit(&mut list)
        }
        Msg::PaginationChanged {
            page,
            items_per_page,
        } => {
            let before = list.state().clone();
            let new_size = items_per_page.map_or(before.items_per_page, |size| size.max(1));
            let mut new_page = page.map_or(before.current_page, |page| page.max(1));
            if new_size != before.items_per_page {
                // Keep the first visible item on screen.
                let first_visible = (new_page - 1).saturating_mul(before.items_per_page);
                new_page = (first_visible / new_size).saturating_add(1);
            }

            let state = list.state_mut();
            state.items_per_page = new_size;
            state.current_page = new_page;
            if *list.state() != before {
                list.invalidate();
            }
            vec![fetch(&mut list), Effect::SaveState(list.state().clone())]
        }
        Msg::SortToggled(field) => {
            let state = list.state_mut();
            if state.order_by_field.as_deref() == Some(field.as_str()) {
                state.order_by_reverse = !state.order_by_reverse;
            } else {
                state.order_by_field = Some(field);
                state.order_by_reverse = false;
            }
            state.current_page = 1;
            commit(&mut list)
        }
        Msg::ParamsChanged(params) => {
            if list.state().extra_params == params {
                return (list, Vec::new());
            }
            let state = list.state_mut();
            state.extra_params = params;
            state.current_page = 1;
            commit(&mut list)
        }
        Msg::RefreshRequested => vec![fetch(&mut list)],
        Msg::FetchSucceeded { seq, page } => {
            if !list.accept_response(seq) {
                return (list, Vec::new());
            }

            let current_page = list.state().current_page;
            let last_page = page_count(page.total_items_count, list.state().items_per_page).max(1);
            if page.items.is_empty() && current_page > last_page {
                // Page ran dry (e.g. its last row was deleted): clamp to the
                // last page that still has items.
                list.state_mut().current_page = last_page;
                commit(&mut list)
            } else {
                list.replace_page(page);
                Vec::new()
            }
        }
        Msg::FetchFailed { seq, error } => {
            if !list.accept_response(seq) {
                return (list, Vec::new());
            }
            // The previous page stays on screen.
            list.mark_loaded();
            vec![Effect::ReportError(error)]
        }
        Msg::PageMissing { seq, error } => {
            if !list.accept_response(seq) {
                return (list, Vec::new());
            }
            let current_page = list.state().current_page;
            if current_page > 1 {
                list.state_mut().current_page = current_page - 1;
                commit(&mut list)
            } else {
                list.mark_loaded();
                vec![Effect::ReportError(error)]
            }
        }
        Msg::Unmounted => {
            let last_state = list.state().clone();
            list.unmount();
            vec![Effect::SaveState(last_state)]
        }
    };

    (list, effects)
}

fn fetch<T, E>(list: &mut ItemsList<T>) -> Effect<E> {
    let (seq, request) = list.issue_request();
    Effect::Fetch { seq, request }
}

/// Effects for a committed state change: a fresh fetch plus a storage push.
fn commit<T, E>(list: &mut ItemsList<T>) -> Vec<Effect<E>> {
    list.invalidate();
    let fetch = fetch(list);
    vec![fetch, Effect::SaveState(list.state().clone())]
}
