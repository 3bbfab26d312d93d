//! iap-ssh-config CLI - Set up SSH config entries for GCP VMs behind IAP
//!
//! This is the main entry point for the Rust CLI binary.

fn main() -> anyhow::Result<()> {
    iap_ssh_config::run()
}
