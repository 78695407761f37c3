//! Config and data directory resolution.
//!
//! `--dir` replaces both directories. Otherwise the XDG base directories
//! are used, falling back to `~/.config` and `~/.local/share`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Directory name under the XDG base directories.
const APP_DIR_NAME: &str = "cinefav";

/// Config file name inside the config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Where cinefav reads its config and keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Path of `config.toml`.
    pub config_file: PathBuf,
    /// Directory holding the database and the TUI log.
    pub data_dir: PathBuf,
}

impl AppDirs {
    /// Resolves the directories from `--dir` or the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is `None` and neither the XDG variable nor
    /// `HOME` is set.
    pub fn resolve(dir: Option<&Path>) -> Result<Self> {
        Self::resolve_with(dir, |name| std::env::var_os(name))
    }

    /// Resolves the directories, reading variables through `env`.
    fn resolve_with(dir: Option<&Path>, env: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        if let Some(dir) = dir {
            return Ok(Self {
                config_file: dir.join(CONFIG_FILE_NAME),
                data_dir: dir.to_path_buf(),
            });
        }

        let base_dir = |xdg_var: &str, home_relative: &[&str]| -> Result<PathBuf> {
            if let Some(base) = env(xdg_var).filter(|v| !v.is_empty()) {
                return Ok(PathBuf::from(base));
            }
            let home = env("HOME")
                .filter(|v| !v.is_empty())
                .context("HOME environment variable is not set")?;
            Ok(home_relative
                .iter()
                .fold(PathBuf::from(home), |path, part| path.join(part)))
        };

        Ok(Self {
            config_file: base_dir("XDG_CONFIG_HOME", &[".config"])?
                .join(APP_DIR_NAME)
                .join(CONFIG_FILE_NAME),
            data_dir: base_dir("XDG_DATA_HOME", &[".local", "share"])?.join(APP_DIR_NAME),
        })
    }
}
