//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Single-threaded directory walking using walkdir
//! - Metadata snapshots for staleness detection
//! - Memoized fingerprints (first block, partial hash, full hash)
//! - Hardlink detection by inode
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`snapshot`]: Point-in-time metadata captured when a file is enrolled
//! - [`hasher`]: Fixed-seed fast hashing (xxh64 or BLAKE3)
//! - [`record`]: [`FileRecord`] with its lazily computed fingerprint
//! - [`hardlink`]: Seen-inode tracking
//! - [`walker`]: Directory traversal and file discovery
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let hasher = Hasher::default();
//! let mut walker = Walker::new(Path::new("/srv/data"), WalkerConfig::default());
//! let records = walker.collect_records(&hasher);
//! println!("{} candidate files", records.len());
//! ```

pub mod hardlink;
pub mod hasher;
pub mod record;
pub mod snapshot;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export main types
pub use hardlink::{InodeKey, InodeTracker};
pub use hasher::{Digest, HashAlgorithm, Hasher, DEFAULT_CHUNK_SIZE, DEFAULT_SEED, PREHASH_SIZE};
pub use record::FileRecord;
pub use snapshot::{MetadataSnapshot, SnapshotError};
pub use walker::{Walker, WalkStats};

/// Path substring whose directories are never descended into.
pub const FUSE_TMP_MARKER: &str = "xzfs_fuse_tmp";

/// Configuration for directory walking.
///
/// Dot-named entries below the root are always skipped and
/// [`FUSE_TMP_MARKER`] is always excluded; `exclude_substrings` adds to that.
/// Symbolic links are followed unless `follow_symlinks` is turned off.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,

    /// Extra path substrings to exclude, in addition to [`FUSE_TMP_MARKER`].
    pub exclude_substrings: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            exclude_substrings: Vec::new(),
        }
    }
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, exclude_substrings: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            exclude_substrings,
        }
    }

    /// Whether a path contains any excluded substring.
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        path.contains(FUSE_TMP_MARKER)
            || self
                .exclude_substrings
                .iter()
                .any(|s| !s.is_empty() && path.contains(s.as_str()))
    }
}

/// Errors that can occur during directory scanning.
///
/// None of these abort a walk; they are logged and counted.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A symlink loop was detected while following links.
    #[error("Filesystem loop at {0}")]
    Loop(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &std::path::Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: Arc::new(error),
            },
        }
    }
}
