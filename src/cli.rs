//! Command-line interface.

use clap::Parser;
use std::path::PathBuf;

/// Extensible plugin HTTP hub.
#[derive(Debug, Parser)]
#[command(name = "homehub", version)]
pub struct Args {
    /// Listen port (overrides the config file).
    #[arg(long)]
    pub port: Option<u16>,

    /// Raise log verbosity to debug.
    #[arg(long)]
    pub debug: bool,

    /// Path to a TOML config file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
