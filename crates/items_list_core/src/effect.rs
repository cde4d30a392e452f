use crate::{ListRequest, ListState, RequestSeq};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<E> {
    /// Run the request through the item source and report back with `seq`.
    Fetch { seq: RequestSeq, request: ListRequest },
    /// Push the full list state to state storage.
    SaveState(ListState),
    /// Forward a fetch failure, unmodified, to the screen's error handler.
    ReportError(E),
}
