//! List-driven file removal.
//!
//! # Overview
//!
//! A deletion list is a JSON object with an `items` array of path strings:
//!
//! ```json
//! { "items": ["/data/b/x.txt", "/data/c/x.txt"] }
//! ```
//!
//! The whole list is validated before anything is removed; a malformed list
//! removes nothing. Each path is then unlinked (or moved to the system trash)
//! independently, and per-item failures are logged without stopping the run.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::actions::delete::{delete_batch, DeleteConfig, DeleteList};
//! use std::path::Path;
//!
//! let list = DeleteList::load(Path::new("to_remove.json")).unwrap();
//! let result = delete_batch(list.items(), &DeleteConfig::default());
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use serde_json::Value;
use thiserror::Error;

/// Problems with the deletion list itself.
#[derive(Debug, Error)]
pub enum DeleteListError {
    /// The list file could not be read.
    #[error("cannot read deletion list {path}: {source}")]
    Read {
        /// List file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The content is not valid JSON.
    #[error("deletion list is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The top-level value has no `items` key.
    #[error("deletion list has no `items` key")]
    MissingItems,

    /// `items` is not an array.
    #[error("`items` is not an array")]
    NotArray,

    /// An element of `items` is not a string.
    #[error("item {index} is not a string: {value}")]
    NotString {
        /// Zero-based position in `items`
        index: usize,
        /// The offending element, as JSON
        value: String,
    },
}

/// A validated list of paths to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteList {
    items: Vec<PathBuf>,
}

impl DeleteList {
    /// Read and validate a list file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its content is malformed.
    pub fn load(path: &Path) -> Result<Self, DeleteListError> {
        let content = fs::read_to_string(path).map_err(|source| DeleteListError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Validate list content.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, a missing or non-array `items`, or any
    /// non-string element.
    pub fn parse(content: &str) -> Result<Self, DeleteListError> {
        let root: Value = serde_json::from_str(content)?;
        let items = root
            .get("items")
            .ok_or(DeleteListError::MissingItems)?
            .as_array()
            .ok_or(DeleteListError::NotArray)?;

        let items = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(PathBuf::from)
                    .ok_or_else(|| DeleteListError::NotString {
                        index,
                        value: item.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { items })
    }

    /// Paths in list order.
    #[must_use]
    pub fn items(&self) -> &[PathBuf] {
        &self.items
    }

    /// Number of paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Error type for a single removal.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Path that failed
        path: PathBuf,
        /// Message from the trash backend
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was removed.
    pub path: PathBuf,
    /// Size of the removed entry in bytes.
    pub size: u64,
    /// Whether the entry went to the trash rather than being unlinked.
    pub trashed: bool,
}

/// Results of a batch removal.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully removed files.
    pub successes: Vec<DeleteResult>,
    /// Failed removals.
    pub failures: Vec<DeleteError>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful removals.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed removals.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all removals succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Removed {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Removed {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for removal.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteConfig {
    /// Move to the system trash instead of unlinking.
    pub trash: bool,
}

impl DeleteConfig {
    /// Set whether files go to the trash.
    #[must_use]
    pub fn with_trash(mut self, trash: bool) -> Self {
        self.trash = trash;
        self
    }
}

/// Remove a single file.
///
/// Symbolic links are removed themselves, never their targets.
///
/// # Errors
///
/// Returns [`DeleteError`] if the path is missing or cannot be removed.
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    if config.trash {
        trash::delete(path).map_err(|e| DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    } else {
        fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        trashed: config.trash,
    })
}

/// Remove every path in order, logging each outcome.
///
/// A failure never stops the batch.
pub fn delete_batch(paths: &[PathBuf], config: &DeleteConfig) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        match delete_file(path, config) {
            Ok(done) => {
                log::info!(
                    "{} {}",
                    if done.trashed { "Trashed" } else { "Removed" },
                    path.display()
                );
                result.bytes_freed += done.size;
                result.successes.push(done);
            }
            Err(e) => {
                log::error!("Error removing {}: {}", path.display(), e);
                result.failures.push(e);
            }
        }
    }

    log::info!("{}", result.summary());
    result
}
