//! CLI command implementations

mod setup;

pub use setup::{SetupArgs, cmd_setup};
