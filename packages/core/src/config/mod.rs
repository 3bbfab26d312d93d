//! Runtime configuration for iap-ssh-config
//!
//! Everything the tool needs beyond its command-line flags comes from the
//! environment: the home directory (for the default SSH config path) and the
//! current user (for the `User` fallback).

pub mod paths;

pub use paths::{get_home_dir, get_ssh_config_path, get_ssh_dir};

/// Environment variable naming the current principal
pub const USER_ENV_VAR: &str = "USER";

/// Get the current user's login name
///
/// Reads `USER`; falls back to the OS account name when it is unset or empty.
pub fn current_user() -> String {
    resolve_user(std::env::var(USER_ENV_VAR).ok())
}

fn resolve_user(env_user: Option<String>) -> String {
    match env_user {
        Some(user) if !user.trim().is_empty() => user,
        _ => whoami::username(),
    }
}
