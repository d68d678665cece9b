//! Inode tracking so hardlinked paths are enrolled only once.
//!
//! # Overview
//!
//! Hardlinks are multiple directory entries pointing to the same inode.
//! They are the same physical file, not duplicates of each other, so the
//! walker enrolls only the first path it meets for each inode.
//!
//! # Platform Support
//!
//! - **Unix**: (device_id, inode) pairs from file metadata
//! - **Other**: no inode information; every file is treated as unique
//!
//! # Example
//!
//! ```
//! use dupfind::scanner::hardlink::{InodeKey, InodeTracker};
//!
//! let mut tracker = InodeTracker::new();
//! let key = InodeKey::new(1, 42);
//!
//! assert!(tracker.first_sighting(key));
//! assert!(!tracker.first_sighting(key)); // second path to the same inode
//! ```

use std::collections::HashSet;
use std::fs::Metadata;

/// Identity of a physical file.
///
/// The device number is part of the key so that equal inode numbers on
/// different filesystems mounted under one root are not confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeKey {
    dev: u64,
    ino: u64,
}

impl InodeKey {
    /// Build a key from raw device and inode numbers.
    #[must_use]
    pub const fn new(dev: u64, ino: u64) -> Self {
        Self { dev, ino }
    }

    /// Inode number.
    #[must_use]
    pub const fn ino(&self) -> u64 {
        self.ino
    }

    /// Extract the key from file metadata.
    ///
    /// Returns `None` on platforms without inode information.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Set of inodes seen during one walk.
///
/// Owned by a [`Walker`](super::Walker) instance, so separate walks never
/// share state.
#[derive(Debug, Default)]
pub struct InodeTracker {
    seen: HashSet<InodeKey>,
}

impl InodeTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Record `key`, returning `true` if it had not been seen before.
    pub fn first_sighting(&mut self, key: InodeKey) -> bool {
        self.seen.insert(key)
    }

    /// Whether `key` was already recorded.
    #[must_use]
    pub fn contains(&self, key: &InodeKey) -> bool {
        self.seen.contains(key)
    }

    /// Number of distinct inodes recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Check if inode tracking is supported on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
