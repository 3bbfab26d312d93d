//! Provisioning data structures
//!
//! The target instance and the connection options parsed from the
//! provider's generated SSH command.

use std::collections::BTreeMap;

/// Reserved option key for the `-i` identity file
pub const IDENTITY_FILE_KEY: &str = "IdentityFile";

/// Option key checked before falling back to the current user
pub const USER_KEY: &str = "User";

/// Prefix applied to instance names to form the SSH host alias
pub const ALIAS_PREFIX: &str = "compute.";

/// The VM an SSH config entry is provisioned for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceTarget {
    /// GCP project ID
    pub project_id: String,

    /// Instance name within the project
    pub instance_name: String,

    /// Zone the instance runs in
    pub zone: String,
}

impl InstanceTarget {
    /// Create a new target
    pub fn new(
        project_id: impl Into<String>,
        instance_name: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            instance_name: instance_name.into(),
            zone: zone.into(),
        }
    }

    /// Host alias written to the SSH config (`compute.<instance>`)
    pub fn alias(&self) -> String {
        format!("{ALIAS_PREFIX}{}", self.instance_name)
    }

    /// Arguments asking the provider to print, not run, the IAP SSH command
    pub fn provider_args(&self) -> Vec<String> {
        vec![
            "compute".to_string(),
            "ssh".to_string(),
            self.instance_name.clone(),
            "--tunnel-through-iap".to_string(),
            "--dry-run".to_string(),
            "--zone".to_string(),
            self.zone.clone(),
            "--project".to_string(),
            self.project_id.clone(),
        ]
    }
}

/// SSH options extracted from a generated SSH command line
///
/// Keys are kept sorted so rendering is deterministic for identical input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    options: BTreeMap<String, String>,
}

impl ConnectionOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any earlier value for the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    /// Look up an option value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Check if an option is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// Identity file recorded from `-i` (or an explicit `-o IdentityFile=`)
    pub fn identity_file(&self) -> Option<&str> {
        self.get(IDENTITY_FILE_KEY)
    }

    /// Iterate options in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
