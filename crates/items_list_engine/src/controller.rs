use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use items_list_core::{
    update, Effect, ItemsList, ListDefaults, ListRequest, ListViewModel, Msg, Page, ParamValue,
    RequestSeq,
};
use panel_logging::{panel_debug, panel_error, panel_warn};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::{FailureKind, FetchError, ItemSource, RouteParams, StateStorage};

const NOT_FOUND: u16 = 404;

pub type ErrorHandler = Box<dyn Fn(FetchError) + Send + Sync>;

struct FetchResult<T> {
    seq: RequestSeq,
    result: Result<Page<T>, FetchError>,
}

/// Drives the items list state machine: forwards intents, runs fetches on the
/// runtime without blocking the caller, and feeds their results back.
///
/// Fetch results are applied when the caller pumps them ([`Self::pump`],
/// [`Self::next_result`] or [`Self::settle`]); superseded results are dropped.
pub struct ListController<S: ItemSource, St: StateStorage> {
    list: ItemsList<S::Item>,
    source: Arc<S>,
    storage: St,
    route: Arc<RouteParams>,
    on_error: ErrorHandler,
    runtime: Handle,
    result_tx: mpsc::UnboundedSender<FetchResult<S::Item>>,
    result_rx: mpsc::UnboundedReceiver<FetchResult<S::Item>>,
}

impl<S: ItemSource, St: StateStorage> ListController<S, St> {
    pub fn new(runtime: Handle, source: S, storage: St, defaults: ListDefaults) -> Self {
        let (result_tx, result_rx) = mpsc::unbounded_channel();
        Self {
            list: ItemsList::new(defaults),
            source: Arc::new(source),
            storage,
            route: Arc::new(RouteParams::new()),
            on_error: Box::new(|err: FetchError| panel_error!("Failed to load items: {}", err)),
            runtime,
            result_tx,
            result_rx,
        }
    }

    pub fn with_route_params(mut self, route: RouteParams) -> Self {
        self.route = Arc::new(route);
        self
    }

    pub fn with_error_handler(
        mut self,
        handler: impl Fn(FetchError) + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Box::new(handler);
        self
    }

    /// Restores state from storage (or defaults) and issues the first fetch.
    pub fn mount(&mut self) {
        let stored = self.storage.load();
        panel_debug!("Mounting list, stored state present: {}", stored.is_some());
        self.dispatch(Msg::Mounted(stored));
    }

    pub fn update_search(&mut self, term: impl Into<String>) {
        self.dispatch(Msg::SearchChanged(term.into()));
    }

    pub fn update_pagination(&mut self, page: Option<u64>, items_per_page: Option<u64>) {
        self.dispatch(Msg::PaginationChanged {
            page,
            items_per_page,
        });
    }

    pub fn toggle_sorting(&mut self, field: impl Into<String>) {
        self.dispatch(Msg::SortToggled(field.into()));
    }

    pub fn update_params(&mut self, params: BTreeMap<String, ParamValue>) {
        self.dispatch(Msg::ParamsChanged(params));
    }

    /// Re-fetches the current page without touching pagination.
    pub fn update(&mut self) {
        self.dispatch(Msg::RefreshRequested);
    }

    /// Flushes the final state to storage and hands the storage back.
    pub fn unmount(mut self) -> St {
        self.dispatch(Msg::Unmounted);
        self.storage
    }

    pub fn view(&self) -> ListViewModel<'_, S::Item> {
        self.list.view()
    }

    pub fn list(&self) -> &ItemsList<S::Item> {
        &self.list
    }

    pub fn storage(&self) -> &St {
        &self.storage
    }

    pub fn route_params(&self) -> &RouteParams {
        &self.route
    }

    pub fn consume_dirty(&mut self) -> bool {
        self.list.consume_dirty()
    }

    /// Applies every fetch result that has already arrived. Never waits.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.result_rx.try_recv() {
            self.apply_result(result);
            applied += 1;
        }
        applied
    }

    /// Waits for the next fetch result, current or stale, and applies it.
    pub async fn next_result(&mut self) {
        // The controller owns a sender, so the channel never closes.
        if let Some(result) = self.result_rx.recv().await {
            self.apply_result(result);
        }
    }

    /// Waits until the latest issued fetch (including any re-fetch it
    /// triggers) has been applied.
    pub async fn settle(&mut self) {
        while self.list.pending_seq().is_some() {
            self.next_result().await;
        }
    }

    pub fn dispatch(&mut self, msg: Msg<S::Item, FetchError>) {
        let list = std::mem::take(&mut self.list);
        let (list, effects) = update(list, msg);
        self.list = list;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn apply_result(&mut self, result: FetchResult<S::Item>) {
        let FetchResult { seq, result } = result;
        if self.list.pending_seq() != Some(seq) {
            panel_debug!("Discarding superseded response seq={}", seq);
        }
        let msg = match result {
            Ok(page) => Msg::FetchSucceeded { seq, page },
            Err(error) if error.kind == FailureKind::HttpStatus(NOT_FOUND) => {
                Msg::PageMissing { seq, error }
            }
            Err(error) => Msg::FetchFailed { seq, error },
        };
        self.dispatch(msg);
    }

    fn run_effect(&mut self, effect: Effect<FetchError>) {
        match effect {
            Effect::Fetch { seq, request } => self.spawn_fetch(seq, request),
            Effect::SaveState(state) => {
                if let Err(err) = self.storage.save(&state) {
                    panel_warn!("Failed to save list state: {}", err);
                }
            }
            Effect::ReportError(error) => (self.on_error)(error),
        }
    }

    fn spawn_fetch(&self, seq: RequestSeq, request: ListRequest) {
        let source = Arc::clone(&self.source);
        let route = Arc::clone(&self.route);
        let tx = self.result_tx.clone();
        panel_debug!("Issuing fetch seq={} page={}", seq, request.page);
        let fetch = self.runtime.spawn(async move {
            let request = source.augment_request(request, &route);
            load_page(source.as_ref(), &request).await
        });
        self.runtime.spawn(async move {
            let result = match fetch.await {
                Ok(result) => result,
                Err(err) => {
                    panel_error!("Fetch seq={} died: {}", seq, err);
                    Err(FetchError::new(FailureKind::Aborted, err.to_string()))
                }
            };
            // Receiver is gone once the controller unmounted.
            let _ = tx.send(FetchResult { seq, result });
        });
    }
}

/// Fetches one page and turns its raw records into items.
pub async fn load_page<S: ItemSource + ?Sized>(
    source: &S,
    request: &ListRequest,
) -> Result<Page<S::Item>, FetchError> {
    let raw = source.fetch_page(request).await?;
    let items = raw
        .results
        .into_iter()
        .map(|record| source.transform_item(record))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Page::new(items, raw.count, Utc::now()))
}
