mod app;
mod logging;
mod ui;

pub use app::{run_app, AppSettings, RowCommand};
