//! Output utilities for the CLI
//!
//! Spinner feedback while the provider runs and styled error display for
//! provisioning failures.

pub mod errors;
pub mod spinner;

pub use errors::show_provision_error;
pub use spinner::CommandSpinner;
