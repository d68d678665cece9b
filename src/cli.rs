//! Command-line interface definitions for dupfind.
//!
//! This module defines all CLI arguments and subcommands using the clap
//! derive API. Global options (verbosity, config file, error format) apply to
//! every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Scan a directory and write the report to dupes.json
//! dupfind scan ~/Downloads dupes
//!
//! # Same, with BLAKE3 fingerprints and debug logging
//! dupfind -v scan ~/Downloads dupes.json --hash blake3
//!
//! # Remove the files named in a deletion list, moving them to the trash
//! dupfind delete to_remove.json --trash
//! ```

use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Find byte-identical files and remove listed duplicates.
///
/// `scan` walks a directory and writes every group of identical regular
/// files to a JSON report. `delete` removes the files named in a JSON list.
#[derive(Debug, Parser)]
#[command(name = "dupfind")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (TOML); defaults to the platform config directory
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files and write a JSON report
    Scan(ScanArgs),
    /// Remove every file named in a JSON deletion list
    Delete(DeleteArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Report file; `.json` is appended when there is no extension
    ///
    /// Must not exist yet.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Fingerprint hash function
    #[arg(long, value_enum, value_name = "ALGO")]
    pub hash: Option<HashAlgorithm>,

    /// Seed for the xxh64 fingerprint
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Streaming buffer size for full hashes and comparisons (e.g. 64KiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Follow symbolic links during scan (the default)
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links; symlinked files and directories are skipped
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Skip paths containing this substring (can be specified multiple times)
    #[arg(short, long = "exclude", value_name = "SUBSTRING")]
    pub exclude: Vec<String>,

    /// Write the report on a single line
    #[arg(long)]
    pub compact: bool,

    /// Do not show a progress spinner
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// JSON file of the form `{"items": ["/path/a", "/path/b"]}`
    #[arg(value_name = "LIST")]
    pub list: PathBuf,

    /// Move files to the system trash instead of unlinking them
    #[arg(long)]
    pub trash: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Accepts plain byte counts and the decimal and binary suffixes that
/// `bytesize` understands (KB, KiB, MB, MiB, ...).
///
/// # Examples
///
/// ```
/// use dupfind::cli::parse_size;
///
/// assert_eq!(parse_size("4096").unwrap(), 4096);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty or not a valid size.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    s.parse::<ByteSize>()
        .map(|size| size.0)
        .map_err(|e| format!("Invalid size '{s}': {e}"))
}
