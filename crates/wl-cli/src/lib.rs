//! Work logger CLI library.
//!
//! This crate provides the CLI interface for the work logger: argument
//! parsing, configuration, the on-disk store and the subcommands.

mod cli;
pub mod commands;
mod config;
pub mod store;

pub use cli::{Cli, Commands, LogArgs, PlacesAction, TaskAction};
pub use config::Config;
