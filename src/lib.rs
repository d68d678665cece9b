//! dupfind - byte-identical duplicate file finder
//!
//! Walks a directory tree, enrolls every eligible regular file once per
//! inode, narrows candidates by size and first-block hash, and confirms
//! duplicates by full hash and streamed byte comparison. Files that change
//! while the scan runs are left out. Results go to a JSON report; a second
//! subcommand removes the files named in a JSON deletion list.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{delete_batch, DeleteConfig, DeleteList};
use crate::cli::{Cli, Commands, DeleteArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use crate::error::ExitCode;
use crate::output::{OutputTarget, Report};
use crate::progress::Progress;

/// Run the parsed command line.
///
/// Logging must already be initialized.
///
/// # Errors
///
/// Returns an error for any fatal condition; map it to an exit code with
/// [`ExitCode::for_error`].
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Scan(ref args) => run_scan(args, cli.config.as_deref(), cli.quiet),
        Commands::Delete(ref args) => run_delete(args),
    }
}

fn run_scan(args: &ScanArgs, config_file: Option<&Path>, quiet: bool) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(config_file).context("Failed to load configuration")?;
    config.apply_scan_args(args)?;
    match config.to_toml() {
        Ok(text) => log::debug!("Effective configuration:\n{}", text),
        Err(_) => log::debug!("Effective configuration: {:?}", config),
    }

    // Root first, then output; nothing is created for a bad root.
    if !args.dir.exists() {
        return Err(FinderError::PathNotFound(args.dir.clone()).into());
    }
    if !args.dir.is_dir() {
        return Err(FinderError::NotADirectory(args.dir.clone()).into());
    }
    let target = OutputTarget::create(&args.output)?;

    log::info!("Searching for duplicates in: {}", args.dir.display());
    log::info!("Report will be saved to: {}", target.path().display());

    let mut finder_config = FinderConfig::default()
        .with_walker_config(config.walker_config())
        .with_hasher(config.hasher());
    if config.progress && !quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    let (groups, summary) = match DuplicateFinder::new(finder_config).find_duplicates(&args.dir) {
        Ok(found) => found,
        Err(e) => {
            target.discard();
            return Err(e.into());
        }
    };

    for error in &summary.scan_errors {
        log::debug!("Skipped during walk: {}", error);
    }

    let report = Report::from_groups(&summary.root, &groups);
    let written = target
        .write_report(&report, config.pretty)
        .context("Failed to write report")?;

    log::info!(
        "Found {} duplicate groups ({} reclaimable), report saved to {}",
        summary.duplicate_groups,
        summary.reclaimable_display(),
        written.display()
    );
    Ok(ExitCode::Success)
}

fn run_delete(args: &DeleteArgs) -> anyhow::Result<ExitCode> {
    let list = DeleteList::load(&args.list)
        .with_context(|| format!("Invalid deletion list {}", args.list.display()))?;
    log::info!(
        "Removing {} file(s) listed in {}",
        list.len(),
        args.list.display()
    );

    let config = DeleteConfig::default().with_trash(args.trash);
    let result = delete_batch(list.items(), &config);

    if result.all_succeeded() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}
