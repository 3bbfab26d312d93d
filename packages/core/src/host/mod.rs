//! Host entry provisioning
//!
//! Provides the pieces that turn a GCP instance into an SSH config entry:
//! - Provider invocation (`gcloud compute ssh --dry-run`)
//! - Option extraction from the generated SSH command
//! - Merging the resulting Host block into an SSH config file

mod error;
mod extract;
mod provider;
mod schema;
mod ssh_config;

// Public exports
pub use error::ProvisionError;
pub use extract::extract;
pub use provider::{DEFAULT_PROVIDER, fetch_ssh_command};
pub use schema::{ALIAS_PREFIX, ConnectionOptions, IDENTITY_FILE_KEY, InstanceTarget, USER_KEY};
pub use ssh_config::{
    MergeDecision, MergeOutcome, alias_resolves, merge, read_ssh_config, render_host_block,
    write_ssh_config,
};
