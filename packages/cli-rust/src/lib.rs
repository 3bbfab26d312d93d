//! iap-ssh-config CLI - Set up SSH config entries for GCP VMs behind IAP
//!
//! This module contains the CLI implementation used by the binary.

mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use iap_ssh_config_core::ProvisionError;
use tracing_subscriber::EnvFilter;

/// Setup SSH config for GCP VM with IAP
#[derive(Parser, Debug)]
#[command(name = "iap-ssh-config")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Setup SSH config for GCP VM with IAP", long_about = None)]
struct Cli {
    #[command(flatten)]
    setup: commands::SetupArgs,

    /// Increase verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Configure color output
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    tracing::debug!("iap-ssh-config {}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(
        "Setting up SSH config for {} (project {}, zone {})",
        cli.setup.instance,
        cli.setup.project,
        cli.setup.zone
    );

    match commands::cmd_setup(&cli.setup, cli.quiet) {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(err) = e.downcast_ref::<ProvisionError>() {
                output::show_provision_error(err);
                std::process::exit(1);
            }
            Err(e)
        }
    }
}

/// Initialize tracing on stderr
///
/// `RUST_LOG` overrides the level picked from `-v`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
