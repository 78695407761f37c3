//! Screen view models and the interactive terminal UI for cinefav.
//!
//! Uses `ratatui` + `crossterm` for rendering. Each screen owns its state
//! in a view model under [`screens`]; the terminal loop only routes keys
//! and async results into them.

mod app;
/// Per-screen view models.
pub mod screens;
mod ui;

pub use app::run_app;
