//! Terminal front-end: folder inputs, the rule editor, the match preview and
//! hand-off to the job queue.

mod app;
mod events;
mod models;
mod rendering;
mod utils;

pub use app::App;
pub use events::run_tui;
pub use models::{Focus, PassStats, StatusMessage};
