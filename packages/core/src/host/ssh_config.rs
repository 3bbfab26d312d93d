//! SSH config file merging and writing
//!
//! Renders a Host block for a provisioned instance and merges it into the
//! user's SSH config. The file is treated as blank-line separated blocks;
//! blocks for other hosts are carried over untouched.
//!
//! The read-merge-write sequence takes no lock, so two runs against the same
//! file can race.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use ssh2_config::{ParseRule, SshConfig};
use tempfile::NamedTempFile;

use super::error::ProvisionError;
use super::schema::{ConnectionOptions, USER_KEY};

/// Separator between blocks in the SSH config file
const BLOCK_SEPARATOR: &str = "\n\n";

/// What a merge does with the file, given the existing blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// No block for the alias yet
    Insert,
    /// A block exists and force was not requested
    Reject,
    /// A block exists and will be replaced
    Replace,
}

impl MergeDecision {
    pub fn new(entry_exists: bool, force_update: bool) -> Self {
        match (entry_exists, force_update) {
            (false, _) => MergeDecision::Insert,
            (true, false) => MergeDecision::Reject,
            (true, true) => MergeDecision::Replace,
        }
    }
}

/// Result of a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Dry run: the block that would be added
    Preview(String),
    /// Full file body to persist
    Write {
        content: String,
        /// Whether an existing block for the alias was replaced
        was_update: bool,
    },
}

/// Render the Host block for an alias
///
/// The alias is used as both the Host pattern and the HostName. A `User`
/// line for `current_user` is added when the options carry none.
pub fn render_host_block(alias: &str, options: &ConnectionOptions, current_user: &str) -> String {
    let mut lines = vec![format!("Host {alias}"), format!("  HostName {alias}")];

    for (key, value) in options.iter() {
        lines.push(format!("  {} {}", key.trim_matches('"'), value));
    }

    if !options.contains_key(USER_KEY) {
        lines.push(format!("  {USER_KEY} {current_user}"));
    }

    lines.join("\n")
}

/// Check whether a block is the Host block for `alias`
///
/// The alias must match as a whole token, so `compute.vm1` does not claim
/// a `Host compute.vm10` block.
fn is_alias_block(block: &str, alias: &str) -> bool {
    let header = format!("Host {alias}");
    match block.trim().strip_prefix(header.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Merge a Host block for `alias` into existing SSH config content
///
/// - `dry_run` returns the rendered block without looking at `existing`.
/// - Without `force_update`, an existing block for the alias is a conflict;
///   otherwise the new block is appended and every existing byte is kept.
/// - With `force_update`, the old alias block and empty blocks are dropped
///   before the new block is appended.
pub fn merge(
    existing: &str,
    alias: &str,
    options: &ConnectionOptions,
    current_user: &str,
    force_update: bool,
    dry_run: bool,
) -> Result<MergeOutcome, ProvisionError> {
    let config_content = render_host_block(alias, options, current_user);

    if dry_run {
        return Ok(MergeOutcome::Preview(config_content));
    }

    let blocks: Vec<&str> = existing.split(BLOCK_SEPARATOR).collect();
    let entry_exists = blocks.iter().any(|block| is_alias_block(block, alias));

    if MergeDecision::new(entry_exists, force_update) == MergeDecision::Reject {
        return Err(ProvisionError::Conflict {
            alias: alias.to_string(),
        });
    }

    let mut new_blocks: Vec<&str> = if force_update {
        blocks
            .into_iter()
            .filter(|block| !is_alias_block(block, alias) && !block.trim().is_empty())
            .collect()
    } else {
        blocks
    };

    new_blocks.push(&config_content);

    let mut content = new_blocks.join(BLOCK_SEPARATOR);
    content.push('\n');

    tracing::debug!(
        "Merged host '{}' into SSH config ({} blocks, update: {})",
        alias,
        new_blocks.len(),
        entry_exists
    );

    Ok(MergeOutcome::Write {
        content,
        was_update: entry_exists,
    })
}

/// Read the SSH config file
///
/// A missing file reads as empty content.
pub fn read_ssh_config(path: &Path) -> Result<String, ProvisionError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            tracing::debug!("Read {} bytes from {}", content.len(), path.display());
            Ok(content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No SSH config file at {}", path.display());
            Ok(String::new())
        }
        Err(e) => Err(ProvisionError::FileRead(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Write the full SSH config body, replacing the file
///
/// Creates the parent directory (0700) if needed. The body goes to a temporary
/// file next to the config which is then renamed over it, so a failed write
/// leaves the old file intact. An existing file keeps its permissions; a new
/// one gets 0644 on Unix. A symlinked config is written through to its target.
pub fn write_ssh_config(path: &Path, content: &str) -> Result<(), ProvisionError> {
    if let Some(ssh_dir) = path.parent() {
        if !ssh_dir.as_os_str().is_empty() && !ssh_dir.exists() {
            fs::create_dir_all(ssh_dir).map_err(|e| {
                ProvisionError::FileWrite(format!("Failed to create {}: {}", ssh_dir.display(), e))
            })?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = fs::Permissions::from_mode(0o700);
                fs::set_permissions(ssh_dir, perms).map_err(|e| {
                    ProvisionError::FileWrite(format!("Failed to set .ssh permissions: {e}"))
                })?;
            }
        }
    }

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let target_dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let existing_perms = fs::metadata(&target).ok().map(|m| m.permissions());

    let mut temp = NamedTempFile::new_in(target_dir).map_err(|e| {
        ProvisionError::FileWrite(format!(
            "Failed to create temporary file in {}: {}",
            target_dir.display(),
            e
        ))
    })?;

    temp.write_all(content.as_bytes())
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| {
            ProvisionError::FileWrite(format!("Failed to write to {}: {}", path.display(), e))
        })?;

    #[cfg(unix)]
    let perms = existing_perms.or_else(|| {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(0o644))
    });
    #[cfg(not(unix))]
    let perms = existing_perms;

    if let Some(perms) = perms {
        fs::set_permissions(temp.path(), perms).map_err(|e| {
            ProvisionError::FileWrite(format!("Failed to set config permissions: {e}"))
        })?;
    }

    temp.persist(&target).map_err(|e| {
        ProvisionError::FileWrite(format!("Failed to replace {}: {}", target.display(), e.error))
    })?;

    tracing::info!("Wrote SSH config to {}", path.display());
    Ok(())
}

/// Check that SSH would resolve `alias` to a HostName in `content`
///
/// Unknown and unsupported options are tolerated. A file that fails to parse
/// counts as not resolving.
pub fn alias_resolves(content: &str, alias: &str) -> bool {
    let mut reader = content.as_bytes();
    let rules = ParseRule::ALLOW_UNKNOWN_FIELDS | ParseRule::ALLOW_UNSUPPORTED_FIELDS;

    let config = match SshConfig::default().parse(&mut reader, rules) {
        Ok(config) => config,
        Err(e) => {
            tracing::debug!("Merged SSH config did not parse: {}", e);
            return false;
        }
    };

    config.query(alias).host_name.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::extract::extract;

    fn sample_options() -> ConnectionOptions {
        let mut options = ConnectionOptions::new();
        options.insert("IdentityFile", "/k/id_rsa");
        options.insert("ProxyCommand", "cmd %h");
        options.insert("UserKnownHostsFile", "/dev/null");
        options
    }

    fn expect_write(outcome: MergeOutcome) -> (String, bool) {
        match outcome {
            MergeOutcome::Write {
                content,
                was_update,
            } => (content, was_update),
            MergeOutcome::Preview(_) => panic!("expected a write outcome"),
        }
    }

    const VM1_BLOCK: &str = "Host compute.vm1\n  HostName compute.vm1\n  IdentityFile /k/id_rsa\n  ProxyCommand cmd %h\n  UserKnownHostsFile /dev/null\n  User alice";

    #[test]
    fn test_render_host_block_adds_user() {
        let block = render_host_block("compute.vm1", &sample_options(), "alice");
        assert_eq!(block, VM1_BLOCK);
    }

    #[test]
    fn test_render_host_block_keeps_explicit_user() {
        let mut options = ConnectionOptions::new();
        options.insert("User", "bob");
        let block = render_host_block("compute.vm1", &options, "alice");
        assert_eq!(block, "Host compute.vm1\n  HostName compute.vm1\n  User bob");
    }

    #[test]
    fn test_merge_decision() {
        assert_eq!(MergeDecision::new(false, false), MergeDecision::Insert);
        assert_eq!(MergeDecision::new(false, true), MergeDecision::Insert);
        assert_eq!(MergeDecision::new(true, false), MergeDecision::Reject);
        assert_eq!(MergeDecision::new(true, true), MergeDecision::Replace);
    }

    #[test]
    fn test_end_to_end_from_command_line() {
        let options = extract(
            "ssh -i /k/id_rsa -o ProxyCommand=\"cmd %h\" -o UserKnownHostsFile=/dev/null user@10.0.0.5",
        )
        .unwrap();
        let outcome = merge("", "compute.vm1", &options, "alice", true, false).unwrap();
        let (content, was_update) = expect_write(outcome);

        assert_eq!(content, format!("{VM1_BLOCK}\n"));
        assert!(!was_update);
    }

    #[test]
    fn test_dry_run_returns_block_only() {
        let existing = "Host compute.vm1\n  HostName old";
        let first = merge(existing, "compute.vm1", &sample_options(), "alice", false, true).unwrap();
        let second = merge("", "compute.vm1", &sample_options(), "alice", false, true).unwrap();

        // Preview ignores existing content, even a conflicting block
        assert_eq!(first, MergeOutcome::Preview(VM1_BLOCK.to_string()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_insert_preserves_existing_blocks() {
        let existing = "Host github.com\n    User git\n    IdentityFile ~/.ssh/gh\n\n\n\nHost *\n\tServerAliveInterval 30";
        let outcome = merge(existing, "compute.vm1", &sample_options(), "alice", false, false).unwrap();
        let (content, was_update) = expect_write(outcome);

        assert!(!was_update);
        assert_eq!(content, format!("{existing}\n\n{VM1_BLOCK}\n"));
    }

    #[test]
    fn test_insert_after_newline_terminated_content() {
        // A file ending in "\n" is kept verbatim, so the appended separator
        // yields two blank lines before the new block
        let existing = "Host a\n  HostName a\n";
        let (content, _) = expect_write(
            merge(existing, "compute.vm1", &sample_options(), "alice", false, false).unwrap(),
        );
        assert_eq!(content, format!("Host a\n  HostName a\n\n\n{VM1_BLOCK}\n"));
    }

    #[test]
    fn test_second_insert_into_own_output() {
        let mut vm2_options = ConnectionOptions::new();
        vm2_options.insert("IdentityFile", "/k/id_rsa");

        let (first, _) = expect_write(
            merge("Host a\n  HostName a", "compute.vm1", &sample_options(), "alice", false, false)
                .unwrap(),
        );
        let (second, was_update) = expect_write(
            merge(&first, "compute.vm2", &vm2_options, "alice", false, false).unwrap(),
        );

        assert!(!was_update);
        assert_eq!(
            second,
            format!(
                "Host a\n  HostName a\n\n{VM1_BLOCK}\n\n\nHost compute.vm2\n  HostName compute.vm2\n  IdentityFile /k/id_rsa\n  User alice\n"
            )
        );
        assert!(second.starts_with(&first));
    }

    #[test]
    fn test_insert_into_empty_file() {
        let outcome = merge("", "compute.vm1", &sample_options(), "alice", false, false).unwrap();
        let (content, _) = expect_write(outcome);

        // The empty leading block is kept verbatim on the non-force path
        assert_eq!(content, format!("\n\n{VM1_BLOCK}\n"));
    }

    #[test]
    fn test_existing_entry_without_force_is_conflict() {
        let existing = "Host other\n  HostName 10.0.0.1\n\nHost compute.vm1\n  HostName compute.vm1\n";
        let err = merge(existing, "compute.vm1", &sample_options(), "alice", false, false)
            .unwrap_err();

        match err {
            ProvisionError::Conflict { alias } => assert_eq!(alias, "compute.vm1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_force_replaces_entry_and_drops_empty_blocks() {
        let existing = "\n\nHost other\n  HostName 10.0.0.1\n\nHost compute.vm1\n  HostName stale\n  User old\n\n\n\nHost last\n  Port 2222";
        let outcome = merge(existing, "compute.vm1", &sample_options(), "alice", true, false).unwrap();
        let (content, was_update) = expect_write(outcome);

        assert!(was_update);
        assert_eq!(
            content,
            format!("Host other\n  HostName 10.0.0.1\n\nHost last\n  Port 2222\n\n{VM1_BLOCK}\n")
        );
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_force_twice_is_idempotent() {
        let existing = "Host other\n  HostName 10.0.0.1";
        let (first, _) = expect_write(
            merge(existing, "compute.vm1", &sample_options(), "alice", true, false).unwrap(),
        );
        let (second, was_update) = expect_write(
            merge(&first, "compute.vm1", &sample_options(), "alice", true, false).unwrap(),
        );

        assert!(was_update);
        assert_eq!(first, second);
        assert_eq!(second.matches("Host compute.vm1").count(), 1);
    }

    #[test]
    fn test_force_twice_from_empty_is_idempotent() {
        let (first, _) =
            expect_write(merge("", "compute.vm1", &sample_options(), "alice", true, false).unwrap());
        let (second, _) = expect_write(
            merge(&first, "compute.vm1", &sample_options(), "alice", true, false).unwrap(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_alias_match_is_exact() {
        let existing = "Host compute.vm10\n  HostName compute.vm10";
        let outcome = merge(existing, "compute.vm1", &sample_options(), "alice", false, false).unwrap();
        let (content, was_update) = expect_write(outcome);

        assert!(!was_update);
        assert!(content.starts_with(existing));
    }

    #[test]
    fn test_is_alias_block() {
        assert!(is_alias_block("  Host compute.vm1\n  HostName x", "compute.vm1"));
        assert!(is_alias_block("Host compute.vm1", "compute.vm1"));
        assert!(is_alias_block("Host compute.vm1 vm1\n  User a", "compute.vm1"));
        assert!(!is_alias_block("Host compute.vm10", "compute.vm1"));
        assert!(!is_alias_block("# Host compute.vm1", "compute.vm1"));
        assert!(!is_alias_block("", "compute.vm1"));
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let content = read_ssh_config(&dir.path().join("config")).unwrap();
        assert!(content.is_empty());
    }

    #[test]
    fn test_read_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_ssh_config(dir.path()).unwrap_err();
        assert!(matches!(err, ProvisionError::FileRead(_)));
    }

    #[test]
    fn test_write_creates_ssh_dir_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".ssh").join("config");

        write_ssh_config(&path, "Host a\n  HostName a\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Host a\n  HostName a\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let dir_mode = fs::metadata(dir.path().join(".ssh")).unwrap().permissions().mode();
            assert_eq!(dir_mode & 0o777, 0o700);

            let file_mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(file_mode & 0o777, 0o644);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_write_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "Host a\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        write_ssh_config(&path, "Host b\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Host b\n");
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "Host a\n").unwrap();

        write_ssh_config(&path, "Host b\n").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("config")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_through_symlinked_config() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("dotfiles-ssh-config");
        let link = dir.path().join("config");
        fs::write(&real, "Host a\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_ssh_config(&link, "Host b\n").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "Host b\n");
    }

    #[test]
    fn test_write_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        fs::write(&path, "a much longer previous body that must disappear").unwrap();

        write_ssh_config(&path, "short\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");
    }

    #[test]
    fn test_conflict_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        let original = "Host compute.foo\n  HostName compute.foo\n  User bob\n";
        fs::write(&path, original).unwrap();

        let existing = read_ssh_config(&path).unwrap();
        let result = merge(&existing, "compute.foo", &sample_options(), "alice", false, false);

        assert!(matches!(result, Err(ProvisionError::Conflict { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_alias_resolves_after_merge() {
        let mut options = ConnectionOptions::new();
        options.insert("IdentityFile", "/k/id_rsa");

        let (content, _) = expect_write(
            merge(
                "Host other\n  HostName 10.0.0.1",
                "compute.vm1",
                &options,
                "alice",
                false,
                false,
            )
            .unwrap(),
        );
        assert!(alias_resolves(&content, "compute.vm1"));
        assert!(!alias_resolves("Host other\n  HostName 10.0.0.1\n", "compute.vm1"));
    }
}
