//! Provisioning error types
//!
//! Errors that can occur while generating and merging an SSH config entry.

use thiserror::Error;

/// Errors that can occur during provisioning
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The provider command failed to spawn, exited non-zero, or printed nothing
    #[error("Error getting SSH command: {0}")]
    ProviderInvocation(String),

    /// The SSH command text handed to the extractor was empty
    #[error("No SSH command output to parse")]
    NoOutput,

    /// Host alias already present and force was not requested
    #[error("SSH config entry already exists for {alias}. Use --force to update")]
    Conflict { alias: String },

    /// Failed to read the SSH config file
    #[error("Error reading SSH config file: {0}")]
    FileRead(String),

    /// Failed to write the SSH config file
    #[error("Error writing to SSH config file: {0}")]
    FileWrite(String),
}
