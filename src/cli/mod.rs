//! CLI parsing and dispatch.

mod commands;

pub use commands::{is_verbose, run, Cli};
