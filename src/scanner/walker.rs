//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which traverses a directory
//! tree on the calling thread and enrolls every eligible regular file as a
//! [`FileRecord`].
//!
//! # Rules
//!
//! - Entries below the root whose name starts with `.` are skipped and
//!   hidden directories are not descended into
//! - Paths containing an excluded substring (always including
//!   [`FUSE_TMP_MARKER`](super::FUSE_TMP_MARKER)) are skipped
//! - Unreadable directories are logged and skipped; the walk continues
//! - Each inode is enrolled at most once (hardlink dedup)
//! - Files that fail snapshot eligibility (empty, missing timestamps,
//!   vanished) are skipped
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let hasher = Hasher::default();
//! let mut walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! walker.for_each_record(&hasher, |record| {
//!     println!("{}: {} bytes", record.path().display(), record.size());
//! });
//! println!("{} directories visited", walker.stats().directories);
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::hardlink::{InodeKey, InodeTracker};
use super::hasher::Hasher;
use super::record::FileRecord;
use super::{ScanError, WalkerConfig};

/// Counters collected during a walk.
#[derive(Debug, Default)]
pub struct WalkStats {
    /// Directories entered (including the root)
    pub directories: usize,
    /// Files enrolled as candidates
    pub enrolled: usize,
    /// Dot-named entries skipped
    pub hidden_skipped: usize,
    /// Entries skipped by path exclusion
    pub excluded_skipped: usize,
    /// Symbolic links skipped
    pub symlinks_skipped: usize,
    /// Additional paths to an already enrolled inode
    pub hardlinks_skipped: usize,
    /// Files whose inode could not be resolved
    pub inode_failures: usize,
    /// Files rejected by snapshot eligibility
    pub ineligible_skipped: usize,
    /// Non-fatal traversal errors
    pub errors: Vec<ScanError>,
}

/// Directory walker for file discovery.
///
/// Owns the seen-inode set for its walk, so a walker instance is
/// self-contained and a fresh instance starts with no history.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Inodes enrolled so far
    inodes: InodeTracker,
    /// Counters for this walk
    stats: WalkStats,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// The root should be absolute; enrolled paths are `root` joined with
    /// the relative entry path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            inodes: InodeTracker::new(),
            stats: WalkStats::default(),
        }
    }

    /// Root of this walk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Counters collected so far.
    #[must_use]
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Consume the walker, returning its counters.
    #[must_use]
    pub fn into_stats(self) -> WalkStats {
        self.stats
    }

    /// Walk the tree and collect every enrolled record.
    pub fn collect_records(&mut self, hasher: &Hasher) -> Vec<FileRecord> {
        let mut records = Vec::new();
        self.for_each_record(hasher, |record| records.push(record));
        records
    }

    /// Walk the tree, handing each enrolled record to `sink` as it is found.
    ///
    /// The first block of every record has been read, and its partial hash
    /// computed, by the time `sink` sees it.
    pub fn for_each_record<F>(&mut self, hasher: &Hasher, mut sink: F)
    where
        F: FnMut(FileRecord),
    {
        if self.config.is_excluded(&self.root.to_string_lossy()) {
            log::info!("Root is excluded, nothing to scan: {}", self.root.display());
            return;
        }

        let config = self.config.clone();
        let mut hidden = 0usize;
        let mut excluded = 0usize;

        let entries = WalkDir::new(&self.root)
            .follow_links(config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| match classify(entry, &config) {
                Filter::Keep => true,
                Filter::Hidden => {
                    log::trace!("Skipping hidden entry: {}", entry.path().display());
                    hidden += 1;
                    false
                }
                Filter::Excluded => {
                    log::trace!("Skipping excluded path: {}", entry.path().display());
                    excluded += 1;
                    false
                }
            });

        for result in entries {
            match result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        self.stats.directories += 1;
                    } else if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        self.stats.symlinks_skipped += 1;
                    } else if file_type.is_file() {
                        if let Some(record) = self.enroll(entry.into_path(), hasher) {
                            sink(record);
                        }
                    }
                }
                Err(e) => {
                    let error = self.handle_walk_error(e);
                    self.stats.errors.push(error);
                }
            }
        }

        self.stats.hidden_skipped += hidden;
        self.stats.excluded_skipped += excluded;
    }

    /// Resolve the inode, dedup it, and build the record.
    fn enroll(&mut self, path: PathBuf, hasher: &Hasher) -> Option<FileRecord> {
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot resolve inode for {}: {}", path.display(), e);
                self.stats.inode_failures += 1;
                return None;
            }
        };

        let inode = InodeKey::from_metadata(&metadata);
        if let Some(key) = inode {
            if !self.inodes.first_sighting(key) {
                log::debug!("Skipping hardlink: {}", path.display());
                self.stats.hardlinks_skipped += 1;
                return None;
            }
        }

        match FileRecord::enroll(path, inode, hasher) {
            Ok(record) => {
                log::trace!("Enrolled {} ({} bytes)", record.path().display(), record.size());
                self.stats.enrolled += 1;
                Some(record)
            }
            Err(e) => {
                log::debug!("Skipping ineligible file: {}", e);
                self.stats.ineligible_skipped += 1;
                None
            }
        }
    }

    /// Convert a walkdir error into a [`ScanError`] and log it.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if error.loop_ancestor().is_some() {
            log::warn!("Filesystem loop detected at {}", path.display());
            return ScanError::Loop(path);
        }

        match error.into_io_error() {
            Some(io) => match io.kind() {
                io::ErrorKind::PermissionDenied => {
                    log::warn!("Permission denied: {}", path.display());
                    ScanError::PermissionDenied(path)
                }
                io::ErrorKind::NotFound => {
                    log::debug!("Disappeared during scan: {}", path.display());
                    ScanError::NotFound(path)
                }
                _ => {
                    log::warn!("I/O error for {}: {}", path.display(), io);
                    ScanError::Io { path, source: io }
                }
            },
            None => {
                log::warn!("Walker error for {}", path.display());
                ScanError::Io {
                    path,
                    source: io::Error::other("directory traversal failed"),
                }
            }
        }
    }
}

enum Filter {
    Keep,
    Hidden,
    Excluded,
}

fn classify(entry: &DirEntry, config: &WalkerConfig) -> Filter {
    // The root itself is vetted before the walk starts.
    if entry.depth() == 0 {
        return Filter::Keep;
    }
    if entry.file_name().to_string_lossy().starts_with('.') {
        return Filter::Hidden;
    }
    if config.is_excluded(&entry.path().to_string_lossy()) {
        return Filter::Excluded;
    }
    Filter::Keep
}
