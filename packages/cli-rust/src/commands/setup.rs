//! Setup command implementation
//!
//! Fetches the IAP SSH command from gcloud and writes a matching Host entry
//! to the SSH config.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use clap::Args;
use console::style;
use iap_ssh_config_core::config::{current_user, get_ssh_config_path};
use iap_ssh_config_core::{
    DEFAULT_PROVIDER, InstanceTarget, MergeOutcome, alias_resolves, extract, fetch_ssh_command,
    merge, read_ssh_config, write_ssh_config,
};

use crate::output::CommandSpinner;

/// Arguments for the setup command
#[derive(Args, Debug)]
pub struct SetupArgs {
    /// GCP project ID
    #[arg(short, long)]
    pub project: String,

    /// GCP instance name
    #[arg(short, long)]
    pub instance: String,

    /// GCP zone
    #[arg(short, long)]
    pub zone: String,

    /// Force update existing entry
    #[arg(short, long)]
    pub force: bool,

    /// Print the config without modifying the SSH config file
    #[arg(long)]
    pub dry_run: bool,

    /// Path to SSH config file (default: ~/.ssh/config)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// gcloud executable used to generate the SSH command
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PROVIDER)]
    pub gcloud: String,
}

/// Run the setup command
pub fn cmd_setup(args: &SetupArgs, quiet: bool) -> Result<()> {
    let target = InstanceTarget::new(&args.project, &args.instance, &args.zone);
    let alias = target.alias();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_ssh_config_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?,
    };

    let spinner = CommandSpinner::new_maybe(
        &format!("Generating IAP SSH command for {}...", target.instance_name),
        quiet,
    );
    let ssh_command = match fetch_ssh_command(&args.gcloud, &target) {
        Ok(command) => {
            spinner.success("SSH command generated");
            command
        }
        Err(e) => {
            spinner.fail("Failed to generate SSH command");
            return Err(e.into());
        }
    };

    let options = extract(&ssh_command)?;
    let user = current_user();

    // Dry run never reads or writes the config file
    let outcome = if args.dry_run {
        merge("", &alias, &options, &user, args.force, true)?
    } else {
        let existing = read_ssh_config(&config_path)?;
        merge(&existing, &alias, &options, &user, args.force, false)?
    };

    match outcome {
        MergeOutcome::Preview(block) => print_preview(&block, &config_path, quiet),
        MergeOutcome::Write {
            content,
            was_update,
        } => {
            if !alias_resolves(&content, &alias) {
                tracing::warn!(
                    "SSH may not resolve '{}' from {}; check the file for earlier matching Host entries",
                    alias,
                    config_path.display()
                );
            }

            write_ssh_config(&config_path, &content)?;

            if !quiet {
                let action = if was_update { "updated" } else { "added" };
                println!(
                    "{} SSH config {} successfully for instance: {}",
                    style("Success:").green().bold(),
                    action,
                    style(&alias).cyan()
                );
                println!(
                    "  {} You can now use: {}",
                    style("Tip:").dim(),
                    style(format!("ssh {alias}")).yellow()
                );
            }
        }
    }

    Ok(())
}

fn print_preview(block: &str, config_path: &Path, quiet: bool) {
    if !quiet {
        println!(
            "The following configuration would be added to {}:",
            style(config_path.display()).yellow()
        );
        println!();
    }

    println!("{block}");

    if !quiet {
        println!();
        println!(
            "To add this configuration manually, append the above content to {}",
            config_path.display()
        );
    }
}
