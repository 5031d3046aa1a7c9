//! Subcommand implementations

pub mod burst;
pub mod complete;
pub mod status;
