//! Corpora CLI library.
//!
//! This library provides the core functionality for the `corpora` command-line
//! interface: project file handling, command execution and output formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
