//! Default locations for config, credentials and the activity log.

use std::env;
use std::path::{Path, PathBuf};

/// Application directory name used under the config and data roots.
const APP_DIR: &str = "nightlight";

/// The user's home directory, from `$HOME`.
pub fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

/// Root for configuration files: `$XDG_CONFIG_HOME` or `~/.config`.
pub fn config_root() -> PathBuf {
    env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}

/// Root for persisted state: `$XDG_DATA_HOME` or `~/.local/share`.
pub fn data_root() -> PathBuf {
    env::var_os("XDG_DATA_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}

/// Expand a leading `~/` to the home directory. Other paths are returned as-is.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = home_dir()
    {
        return home.join(stripped);
    }
    path.to_path_buf()
}
