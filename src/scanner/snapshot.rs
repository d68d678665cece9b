//! Point-in-time metadata snapshots for staleness detection.
//!
//! A [`MetadataSnapshot`] records the attributes that identify a file's
//! state when it is enrolled: size and the access, modification and
//! status-change times at one-second granularity. Any later difference in
//! these means the file can no longer be trusted as a duplicate.

use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};

/// Reasons a path cannot be snapshotted.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    /// The path could not be stat'ed.
    #[error("cannot stat {path}: {source}")]
    Stat {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The path is not a regular file.
    #[error("not a regular file: {0}")]
    NotRegular(PathBuf),

    /// The file is empty.
    #[error("empty file: {0}")]
    Empty(PathBuf),

    /// At least one timestamp is zero or unavailable.
    #[error("missing timestamp: {0}")]
    MissingTimestamp(PathBuf),

    /// The file changed while it was being enrolled.
    #[error("changed during enrollment: {0}")]
    Changed(PathBuf),
}

/// Identity-relevant attributes of a file at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataSnapshot {
    /// Size in bytes
    pub size: u64,
    /// Last access time, seconds since the epoch
    pub atime: i64,
    /// Last modification time, seconds since the epoch
    pub mtime: i64,
    /// Last status change time, seconds since the epoch
    pub ctime: i64,
}

impl MetadataSnapshot {
    /// Stat `path` (following symlinks) and build a snapshot.
    ///
    /// # Errors
    ///
    /// Fails unless the path is an existing regular file with nonzero size
    /// and nonzero access, modification and status-change times.
    pub fn capture(path: &Path) -> Result<Self, SnapshotError> {
        let metadata = fs::metadata(path).map_err(|source| SnapshotError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_metadata(path, &metadata)
    }

    /// Build a snapshot from already-fetched metadata.
    ///
    /// # Errors
    ///
    /// Same eligibility rules as [`capture`](Self::capture).
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self, SnapshotError> {
        if !metadata.is_file() {
            return Err(SnapshotError::NotRegular(path.to_path_buf()));
        }

        let size = metadata.len();
        if size == 0 {
            return Err(SnapshotError::Empty(path.to_path_buf()));
        }

        let (atime, mtime, ctime) = timestamps(metadata);
        if atime == 0 || mtime == 0 || ctime == 0 {
            return Err(SnapshotError::MissingTimestamp(path.to_path_buf()));
        }

        Ok(Self {
            size,
            atime,
            mtime,
            ctime,
        })
    }

    /// Whether `path` no longer matches this snapshot.
    ///
    /// A path that cannot be re-stat'ed, or is no longer a regular file,
    /// counts as changed.
    #[must_use]
    pub fn is_stale(&self, path: &Path) -> bool {
        match Self::capture(path) {
            Ok(current) => current != *self,
            Err(e) => {
                log::trace!("Re-stat failed, treating as changed: {}", e);
                true
            }
        }
    }
}

#[cfg(unix)]
fn timestamps(metadata: &Metadata) -> (i64, i64, i64) {
    use std::os::unix::fs::MetadataExt;
    (metadata.atime(), metadata.mtime(), metadata.ctime())
}

#[cfg(not(unix))]
fn timestamps(metadata: &Metadata) -> (i64, i64, i64) {
    use std::time::{SystemTime, UNIX_EPOCH};

    // No status-change time off Unix; creation time stands in for it.
    let secs = |t: io::Result<SystemTime>| {
        t.ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs() as i64)
    };
    (
        secs(metadata.accessed()),
        secs(metadata.modified()),
        secs(metadata.created()),
    )
}
