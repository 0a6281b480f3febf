//! Ratatui front-end: a form over a record table, with modal notices and
//! confirmations standing in for message boxes.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
