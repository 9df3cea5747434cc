//! CLI module - Command-line interface for the application.
//!
//! - `serve` starts the HTTP server (migrations run on startup)
//! - `migrate` manages the schema by hand

pub mod args;

pub use args::{Cli, Commands};
