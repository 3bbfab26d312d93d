//! SSH command option extraction
//!
//! Turns the SSH invocation printed by `gcloud compute ssh --dry-run` into
//! a set of SSH config options.
//!
//! The line is split on the literal ` -o ` separator, so an option value that
//! itself contains ` -o ` is split incorrectly. No escaping rule is applied.

use super::error::ProvisionError;
use super::schema::{ConnectionOptions, IDENTITY_FILE_KEY};

const OPTION_SEPARATOR: &str = " -o ";

/// Parse a generated SSH command line into connection options
///
/// `-i <path>` is recorded under `IdentityFile`; every `-o key=value` becomes
/// one option, later duplicates replacing earlier ones. The trailing
/// `user@host` target is dropped.
pub fn extract(raw_command_line: &str) -> Result<ConnectionOptions, ProvisionError> {
    let command = raw_command_line.trim();
    if command.is_empty() {
        return Err(ProvisionError::NoOutput);
    }

    let mut options = ConnectionOptions::new();

    if let Some(path) = find_identity_file(command) {
        options.insert(IDENTITY_FILE_KEY, strip_quotes(path));
    }

    let segments: Vec<&str> = command.split(OPTION_SEPARATOR).collect();
    let last = segments.len() - 1;

    for (i, segment) in segments.iter().enumerate().skip(1) {
        let mut segment = *segment;
        // The final -o value may be followed by the user@host target
        if i == last {
            if let Some(idx) = segment.find(char::is_whitespace) {
                segment = &segment[..idx];
            }
        }

        if let Some((key, value)) = segment.split_once('=') {
            let key = key.trim().trim_matches('"');
            options.insert(key, strip_quotes(value));
        }
    }

    tracing::debug!("Extracted {} SSH options", options.len());
    Ok(options)
}

/// Find the token following the first standalone `-i` flag
fn find_identity_file(command: &str) -> Option<&str> {
    for (idx, flag) in command.match_indices("-i") {
        let standalone = command[..idx]
            .chars()
            .next_back()
            .is_none_or(char::is_whitespace);
        if !standalone {
            // part of a longer word, e.g. `--tunnel-through-iap`
            continue;
        }

        let rest = &command[idx + flag.len()..];
        let value = rest.trim_start();
        if value.len() == rest.len() {
            // `-i` must be followed by whitespace
            continue;
        }

        let end = value.find(char::is_whitespace).unwrap_or(value.len());
        if end > 0 {
            return Some(&value[..end]);
        }
    }
    None
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}
