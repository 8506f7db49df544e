//! Configuration management
//!
//! Reads config from `$HOME/.config/kubsh/config.toml`. Every field is
//! optional; missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config paths, relative to `$HOME`
const CONFIG_FILE: &str = ".config/kubsh/config.toml";

/// Errors while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Prompt shown when stdin is a terminal.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// History file; relative paths are resolved against `$HOME`.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Directory mirroring system accounts.
    #[serde(default = "default_vfs_root")]
    pub vfs_root: PathBuf,

    /// Account database read by the VFS mirror and by `cat`.
    #[serde(default = "default_passwd_file")]
    pub passwd_file: PathBuf,

    #[serde(default = "default_true")]
    pub sync_vfs_on_start: bool,

    /// Run `adduser`/`userdel` when VFS user directories are created/removed.
    #[serde(default = "default_true")]
    pub provision_accounts: bool,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            history_file: default_history_file(),
            vfs_root: default_vfs_root(),
            passwd_file: default_passwd_file(),
            sync_vfs_on_start: default_true(),
            provision_accounts: default_true(),
            log_level: default_log_level(),
        }
    }
}

fn default_prompt() -> String {
    "kubsh> ".to_string()
}

fn default_history_file() -> PathBuf {
    PathBuf::from(".kubsh_history")
}

fn default_vfs_root() -> PathBuf {
    PathBuf::from("/opt/users")
}

fn default_passwd_file() -> PathBuf {
    PathBuf::from("/etc/passwd")
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Parse config from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `$HOME/.config/kubsh/config.toml`, if `$HOME` is set.
    pub fn default_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(CONFIG_FILE))
    }

    /// Absolute location of the history file.
    ///
    /// `None` when the configured path is relative and `$HOME` is unset.
    pub fn history_path(&self) -> Option<PathBuf> {
        if self.history_file.is_absolute() {
            return Some(self.history_file.clone());
        }
        home_dir().map(|home| home.join(&self.history_file))
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}
