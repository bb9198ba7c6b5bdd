//! Configuration for the `zisraw-dump` diagnostic binary.
//!
//! The library itself takes no configuration beyond [`crate::container::OpenOptions`];
//! this module covers only the command-line surface of the diagnostic tool.
//!
//! # Environment Variables
//!
//! - `ZISRAW_MAX_ENTRIES` - cap on tiles listed per level in `dump` (default: 20)
//! - `ZISRAW_LENIENT` - downgrade unknown dimension identifiers to warnings (default: false)

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_MAX_ENTRIES: usize = 20;

/// zisraw-dump - inspect ZISRAW/CZI container files.
#[derive(Parser, Debug, Clone)]
#[command(name = "zisraw-dump")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Open a container and print its headers, pyramid, and capabilities.
    Dump {
        path: PathBuf,

        /// Maximum number of tiles to list per level.
        #[arg(long, default_value_t = DEFAULT_MAX_ENTRIES, env = "ZISRAW_MAX_ENTRIES")]
        max_entries: usize,

        /// Downgrade unknown dimension identifiers to warnings instead of failing.
        #[arg(long, default_value_t = false, env = "ZISRAW_LENIENT")]
        lenient: bool,

        /// Emit the dump as JSON instead of the human-readable text report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Cheaply check whether a file begins with a ZISRAWFILE segment.
    Probe { path: PathBuf },
}

/// Validated arguments for the `dump` subcommand.
#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub path: PathBuf,
    pub max_entries: usize,
    pub lenient: bool,
    pub json: bool,
}

/// Validated arguments for the `probe` subcommand.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub path: PathBuf,
}

pub enum Command {
    Dump(DumpConfig),
    Probe(ProbeConfig),
}

impl Cli {
    pub fn into_command(self) -> Command {
        match self.command {
            Commands::Dump {
                path,
                max_entries,
                lenient,
                json,
            } => Command::Dump(DumpConfig {
                path,
                max_entries,
                lenient,
                json,
            }),
            Commands::Probe { path } => Command::Probe(ProbeConfig { path }),
        }
    }
}

impl DumpConfig {
    /// Validate the configuration, returning an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.path.exists() {
            return Err(format!("no such file: {}", self.path.display()));
        }
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }
        Ok(())
    }
}
