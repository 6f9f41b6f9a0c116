//! Command-line interface.
//!
//! Two subcommands: `create-microservice` turns a JSON config into a
//! project tree on disk, and `publish` pushes a generated tree to a new
//! GitHub repository.

pub mod commands;

pub use commands::{run_cli, Cli, Commands};
