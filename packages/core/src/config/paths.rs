//! Path resolution for the SSH config
//!
//! `HOME` wins when set and non-empty so the tool follows the same home
//! directory as `ssh` itself; otherwise the platform home directory is used.

use std::path::PathBuf;

/// Get the user's home directory
pub fn get_home_dir() -> Option<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => dirs::home_dir(),
    }
}

/// Get the user's `.ssh` directory
///
/// Returns: `{home}/.ssh`
pub fn get_ssh_dir() -> Option<PathBuf> {
    get_home_dir().map(|home| home.join(".ssh"))
}

/// Get the path to the user's SSH config file
///
/// Returns: `{home}/.ssh/config`
pub fn get_ssh_config_path() -> Option<PathBuf> {
    get_ssh_dir().map(|dir| dir.join("config"))
}
