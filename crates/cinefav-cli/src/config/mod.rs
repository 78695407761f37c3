//! Application configuration module.
//!
//! Manages the TOML config file holding OMDb access settings and the
//! directories cinefav reads from and writes to.

#[allow(clippy::module_inception)]
mod config;
mod paths;

pub use config::{API_KEY_ENV, AppConfig};
pub use paths::AppDirs;
