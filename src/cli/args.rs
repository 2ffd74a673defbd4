//! CLI argument definitions using clap
//!
//! Commands:
//! - strictjson check --schema <schema> [--config <path>] <document>
//! - strictjson describe --schema <schema> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::io::Output;

/// strictjson - exact key-set validation for JSON documents
#[derive(Parser, Debug)]
#[command(name = "strictjson")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a document against a schema definition
    Check {
        /// Schema definition file, or a schema name looked up in `schema_dir`
        #[arg(long)]
        schema: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Indent the result line
        #[arg(long)]
        pretty: bool,

        /// Document to check; `-` reads stdin
        document: PathBuf,
    },

    /// Print the key tree of a schema definition
    Describe {
        /// Schema definition file, or a schema name looked up in `schema_dir`
        #[arg(long)]
        schema: String,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Indent the result
        #[arg(long)]
        pretty: bool,
    },
}

impl Command {
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Command::Check { config, .. } | Command::Describe { config, .. } => config.as_ref(),
        }
    }

    pub fn output(&self) -> Output {
        match self {
            Command::Check { pretty, .. } | Command::Describe { pretty, .. } => {
                Output::from_flag(*pretty)
            }
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
