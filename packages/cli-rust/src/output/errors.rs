//! Rich error display for provisioning failures

use console::style;
use iap_ssh_config_core::ProvisionError;

/// Print a provisioning error with a headline and a tip for the operator
pub fn show_provision_error(err: &ProvisionError) {
    match err {
        ProvisionError::ProviderInvocation(msg) => {
            eprintln!(
                "{} Failed to get SSH command from gcloud",
                style("Error:").red().bold()
            );
            eprintln!();
            eprintln!("  {}", msg);
            eprintln!();
            eprintln!(
                "  {} Check that you are logged in: {}",
                style("Tip:").cyan(),
                style("gcloud auth login").green()
            );
        }
        ProvisionError::NoOutput => {
            eprintln!(
                "{} gcloud did not print an SSH command",
                style("Error:").red().bold()
            );
            eprintln!();
            eprintln!(
                "  {} Make sure the input arguments are correct and you have access to the instance.",
                style("Tip:").cyan()
            );
        }
        ProvisionError::Conflict { alias } => {
            eprintln!(
                "{} SSH config entry already exists",
                style("Error:").red().bold()
            );
            eprintln!();
            eprintln!("  Host: {}", style(alias).yellow());
            eprintln!();
            eprintln!(
                "  {} Re-run with {} to replace it.",
                style("Tip:").cyan(),
                style("--force").green()
            );
        }
        ProvisionError::FileRead(msg) | ProvisionError::FileWrite(msg) => {
            eprintln!("{} {}", style("Error:").red().bold(), file_error_headline(err));
            eprintln!();
            eprintln!("  {}", msg);
            eprintln!();
            eprintln!(
                "  {} Check permissions for the file, or pass {} to use another path.",
                style("Tip:").cyan(),
                style("--config <PATH>").green()
            );
        }
    }
}

fn file_error_headline(err: &ProvisionError) -> &'static str {
    match err {
        ProvisionError::FileRead(_) => "Could not read SSH config file",
        _ => "Could not write SSH config file",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_error_headline_matches_kind() {
        assert_eq!(
            file_error_headline(&ProvisionError::FileRead("x".to_string())),
            "Could not read SSH config file"
        );
        assert_eq!(
            file_error_headline(&ProvisionError::FileWrite("x".to_string())),
            "Could not write SSH config file"
        );
    }
}
