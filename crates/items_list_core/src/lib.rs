//! Items list core: the collection view controller as a pure state machine.
mod effect;
mod msg;
mod request;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use request::ListRequest;
pub use state::{
    compile_order_by, page_count, parse_order_by, ItemsList, ListDefaults, ListState, Page,
    ParamValue, RequestSeq,
};
pub use update::update;
pub use view_model::{paginator_window, ListViewModel};
