//! # Configuration
//!
//! StoryLab configuration is loaded with [`confique`], layered in priority
//! order:
//!
//! 1. **Environment variables**: `STORYLAB_DATA_DIR`, `STORYLAB_USER`,
//!    `STORYLAB_RANK_WARN_LENGTH`, `STORYLAB_EXPORT_DIR`.
//! 2. **Config file**: `storylab.toml` in the OS config directory (via the
//!    `directories` crate), or a file given explicitly.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! The CLI applies its `--data-dir` and `--user` flags on top of the loaded
//! values.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `data_dir` | OS data dir | Where book records are stored |
//! | `user` | `$USER`, else `author` | Identity used for ownership |
//! | `rank_warn_length` | `12` | Warn when a card rank gets longer than this |
//! | `export_dir` | current dir | Where `export` writes template files |

use std::path::{Path, PathBuf};

use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoryError};

pub const CONFIG_FILE_NAME: &str = "storylab.toml";
pub const DEFAULT_RANK_WARN_LENGTH: usize = 12;

/// Configuration for storylab, stored in `storylab.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoryLabConfig {
    /// Directory holding one JSON record per book.
    #[config(env = "STORYLAB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// User id that owns new books and is checked against existing ones.
    #[config(env = "STORYLAB_USER")]
    pub user: Option<String>,

    /// Card ranks longer than this trigger a rebalance hint.
    #[config(env = "STORYLAB_RANK_WARN_LENGTH", default = 12)]
    pub rank_warn_length: usize,

    /// Directory where exported templates are written.
    #[config(env = "STORYLAB_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Default for StoryLabConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            user: None,
            rank_warn_length: DEFAULT_RANK_WARN_LENGTH,
            export_dir: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "storylab", "storylab")
}

impl StoryLabConfig {
    /// Loads from the environment and the default config file, if any.
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::builder().env().load().map_err(config_error),
        }
    }

    /// Loads from the environment and `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::builder()
            .env()
            .file(path)
            .load()
            .map_err(config_error)
    }

    /// The configured data directory, or the OS data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| StoryError::Config("could not determine a data directory".to_string()))
    }

    /// The configured user, else `$USER`, else `author`.
    pub fn user(&self) -> String {
        self.user
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| "author".to_string())
    }

    /// Export directory, defaulting to the current directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// A commented sample `storylab.toml` listing every setting.
    pub fn sample_toml() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }
}

/// `<OS config dir>/storylab.toml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn config_error(err: confique::Error) -> StoryError {
    StoryError::Config(err.to_string())
}
