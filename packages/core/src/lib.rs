//! iap-ssh-config-core - Core library for iap-ssh-config
//!
//! Extracts SSH options from the command `gcloud compute ssh --dry-run`
//! prints for an IAP-tunnelled instance, and merges them into an SSH config
//! file as a `Host compute.<instance>` block.

pub mod config;
pub mod host;

// Re-export host provisioning for convenience
pub use host::{
    ConnectionOptions, DEFAULT_PROVIDER, InstanceTarget, MergeDecision, MergeOutcome,
    ProvisionError, alias_resolves, extract, fetch_ssh_command, merge, read_ssh_config,
    render_host_block, write_ssh_config,
};
