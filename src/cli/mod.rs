//! CLI module for strictjson
//!
//! Provides command-line interface for:
//! - check: Validate a document against a schema definition
//! - describe: Print a schema's key tree

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{check, describe, resolve_schema, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_error, write_response, write_to, Output};
