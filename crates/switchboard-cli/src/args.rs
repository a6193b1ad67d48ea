//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

/// Lays out a diagram document and writes an SVG snapshot or the placed
/// document.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Diagram document (JSON)
    pub input: PathBuf,

    /// Output path; a `.json` extension writes the placed document, any
    /// other an SVG snapshot
    #[arg(short, long, default_value = "out.svg")]
    pub output: PathBuf,

    /// Configuration file (TOML) to use instead of the search path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}
