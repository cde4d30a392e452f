//! Items list engine: collaborators of the collection view controller and the
//! async driver that runs its effects.
mod controller;
mod fetch;
mod persist;
mod source;
mod storage;
mod types;

pub use controller::{load_page, ErrorHandler, ListController};
pub use fetch::{ReqwestResource, ResourceSettings};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use source::{ItemSource, Resource};
pub use storage::{
    FileStateStorage, MemoryStateStorage, StateStorage, StorageError, UrlStateStorage,
};
pub use types::{FailureKind, FetchError, RawPage, RouteParams};
