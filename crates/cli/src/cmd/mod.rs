//! CLI command implementations

pub mod drain;
pub mod watch;
