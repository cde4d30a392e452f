use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use items_list_core::{compile_order_by, parse_order_by, ListDefaults, ListState, ParamValue};
use panel_logging::{panel_debug, panel_warn};
use thiserror::Error;
use url::Url;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to serialize list state: {0}")]
    Serialize(String),
}

/// Where a screen keeps its list state between visits.
pub trait StateStorage: Send {
    fn load(&self) -> Option<ListState>;
    fn save(&mut self, state: &ListState) -> Result<(), StorageError>;
}

const PAGE_KEY: &str = "page";
const PAGE_SIZE_KEY: &str = "page_size";
const ORDER_KEY: &str = "order";
const SEARCH_KEY: &str = "q";
/// Sort applied to full-text search results when the location names none.
const SEARCH_ORDER: &str = "-rank";

/// Keeps list state in the query string of a navigable location, so a
/// reload or a shared link reproduces the same view.
#[derive(Debug, Clone)]
pub struct UrlStateStorage {
    location: Url,
    defaults: ListDefaults,
}

impl UrlStateStorage {
    pub fn new(location: Url, defaults: ListDefaults) -> Self {
        Self { location, defaults }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn into_location(self) -> Url {
        self.location
    }
}

impl StateStorage for UrlStateStorage {
    fn load(&self) -> Option<ListState> {
        let mut pairs = self.location.query_pairs().peekable();
        pairs.peek()?;

        let mut page = None;
        let mut page_size = None;
        let mut order = None;
        let mut search_term = String::new();
        let mut extra: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (key, value) in pairs {
            match key.as_ref() {
                PAGE_KEY => page = value.parse::<u64>().ok().filter(|page| *page > 0),
                PAGE_SIZE_KEY => page_size = value.parse::<u64>().ok().filter(|size| *size > 0),
                ORDER_KEY => order = Some(value.into_owned()),
                SEARCH_KEY => search_term = value.into_owned(),
                _ => extra
                    .entry(key.into_owned())
                    .or_default()
                    .push(value.into_owned()),
            }
        }

        let (order_by_field, order_by_reverse) = match order {
            Some(order) => parse_order_by(&order),
            None if !search_term.is_empty() => parse_order_by(SEARCH_ORDER),
            None => (
                self.defaults.order_by_field.clone(),
                self.defaults.order_by_reverse,
            ),
        };

        let extra_params = extra
            .into_iter()
            .map(|(key, mut values)| {
                let value = if values.len() == 1 {
                    ParamValue::Text(values.remove(0))
                } else {
                    ParamValue::List(values)
                };
                (key, value)
            })
            .collect();

        Some(ListState {
            current_page: page.unwrap_or(1),
            items_per_page: page_size.unwrap_or(self.defaults.items_per_page),
            order_by_field,
            order_by_reverse,
            search_term,
            extra_params,
        })
    }

    fn save(&mut self, state: &ListState) -> Result<(), StorageError> {
        {
            let mut query = self.location.query_pairs_mut();
            query.clear();
            query.append_pair(PAGE_KEY, &state.current_page.to_string());
            query.append_pair(PAGE_SIZE_KEY, &state.items_per_page.to_string());
            if let Some(order) =
                compile_order_by(state.order_by_field.as_deref(), state.order_by_reverse)
            {
                query.append_pair(ORDER_KEY, &order);
            }
            if !state.search_term.is_empty() {
                query.append_pair(SEARCH_KEY, &state.search_term);
            }
            for (key, value) in &state.extra_params {
                for rendered in value.to_query_values() {
                    query.append_pair(key, &rendered);
                }
            }
        }
        panel_debug!("Location now {}", self.location);
        Ok(())
    }
}

/// Process-local storage; the state lives as long as the value does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStorage {
    state: Option<ListState>,
    saves: usize,
}

impl MemoryStateStorage {
    pub fn new(state: Option<ListState>) -> Self {
        Self { state, saves: 0 }
    }

    pub fn state(&self) -> Option<&ListState> {
        self.state.as_ref()
    }

    /// Number of saves seen so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl StateStorage for MemoryStateStorage {
    fn load(&self) -> Option<ListState> {
        self.state.clone()
    }

    fn save(&mut self, state: &ListState) -> Result<(), StorageError> {
        self.state = Some(state.clone());
        self.saves += 1;
        Ok(())
    }
}

/// Keeps list state as RON in `{dir}/{filename}`.
#[derive(Debug, Clone)]
pub struct FileStateStorage {
    writer: AtomicFileWriter,
    filename: String,
}

impl FileStateStorage {
    pub fn new(dir: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            filename: filename.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(&self.filename)
    }
}

impl StateStorage for FileStateStorage {
    fn load(&self) -> Option<ListState> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                panel_warn!("Failed to read list state from {:?}: {}", path, err);
                return None;
            }
        };
        parse_state(&path, &content)
    }

    fn save(&mut self, state: &ListState) -> Result<(), StorageError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(state, pretty)
            .map_err(|err| StorageError::Serialize(err.to_string()))?;
        self.writer.write(&self.filename, &content)?;
        Ok(())
    }
}

fn parse_state(path: &Path, content: &str) -> Option<ListState> {
    match ron::from_str(content) {
        Ok(state) => Some(state),
        Err(err) => {
            panel_warn!("Failed to parse list state from {:?}: {}", path, err);
            None
        }
    }
}
