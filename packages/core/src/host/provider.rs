//! Provider command invocation
//!
//! Asks `gcloud` for the SSH command it would use to reach an instance
//! through an IAP tunnel, without running it.

use std::process::{Command, Stdio};

use super::error::ProvisionError;
use super::schema::InstanceTarget;

/// Default provider program
pub const DEFAULT_PROVIDER: &str = "gcloud";

const ACCESS_HINT: &str =
    "Make sure the input arguments are correct and you have access to the instance!";

/// Run the provider in dry-run mode and capture the SSH command it prints
///
/// Runs `<program> compute ssh <instance> --tunnel-through-iap --dry-run
/// --zone <zone> --project <project>`. Blocks until the provider exits; no
/// timeout or retry is applied.
pub fn fetch_ssh_command(program: &str, target: &InstanceTarget) -> Result<String, ProvisionError> {
    let args = target.provider_args();

    tracing::debug!("Running provider: {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProvisionError::ProviderInvocation(format!(
                    "{program} not found. Install the Google Cloud SDK and ensure it is on PATH."
                ))
            } else {
                ProvisionError::ProviderInvocation(format!("{e}\n{ACCESS_HINT}"))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!("Provider stderr: {}", stderr.trim());
        return Err(ProvisionError::ProviderInvocation(format!(
            "{} exited with {}\n{}",
            program, output.status, ACCESS_HINT
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return Err(ProvisionError::ProviderInvocation(format!(
            "{program} produced no output\n{ACCESS_HINT}"
        )));
    }

    tracing::debug!("Provider SSH command: {}", stdout);
    Ok(stdout)
}
