//! Candidate file records with memoized fingerprints.
//!
//! A [`FileRecord`] pairs a path with the [`MetadataSnapshot`] taken when it
//! was enrolled. Its fingerprint (first block, partial hash, full hash) is
//! computed on first request and cached for the rest of the run; each value
//! lives in its own [`OnceCell`], so it is computed at most once.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use super::hardlink::InodeKey;
use super::hasher::{read_first_block, Digest, Hasher};
use super::snapshot::{MetadataSnapshot, SnapshotError};

/// An eligible regular file discovered during a walk.
#[derive(Debug)]
pub struct FileRecord {
    path: PathBuf,
    inode: Option<InodeKey>,
    snapshot: MetadataSnapshot,
    first_block: OnceCell<Option<Box<[u8]>>>,
    partial_hash: OnceCell<Digest>,
    full_hash: OnceCell<Digest>,
}

impl FileRecord {
    /// Snapshot `path` and create a record with an empty fingerprint cache.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the path is not an eligible file.
    pub fn new(path: PathBuf, inode: Option<InodeKey>) -> Result<Self, SnapshotError> {
        let snapshot = MetadataSnapshot::capture(&path)?;
        Ok(Self::with_snapshot(path, inode, snapshot))
    }

    /// Create a record from an existing snapshot.
    #[must_use]
    pub fn with_snapshot(path: PathBuf, inode: Option<InodeKey>, snapshot: MetadataSnapshot) -> Self {
        Self {
            path,
            inode,
            snapshot,
            first_block: OnceCell::new(),
            partial_hash: OnceCell::new(),
            full_hash: OnceCell::new(),
        }
    }

    /// Enroll a file found by the walker.
    ///
    /// Checks eligibility, reads the first block, then takes the staleness
    /// baseline. The baseline comes after the read so that the access-time
    /// update caused by enrollment itself does not count as a change.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] if the file is ineligible before or after
    /// the read, or if its size, modification or status-change time changed
    /// across the read.
    pub fn enroll(
        path: PathBuf,
        inode: Option<InodeKey>,
        hasher: &Hasher,
    ) -> Result<Self, SnapshotError> {
        Self::enroll_with(path, inode, hasher, load_first_block)
    }

    fn enroll_with<R>(
        path: PathBuf,
        inode: Option<InodeKey>,
        hasher: &Hasher,
        read: R,
    ) -> Result<Self, SnapshotError>
    where
        R: FnOnce(&Path) -> Option<Box<[u8]>>,
    {
        let before = MetadataSnapshot::capture(&path)?;
        let block = read(&path);
        let snapshot = MetadataSnapshot::capture(&path)?;
        if snapshot.size != before.size
            || snapshot.mtime != before.mtime
            || snapshot.ctime != before.ctime
        {
            return Err(SnapshotError::Changed(path));
        }

        let record = Self::with_snapshot(path, inode, snapshot);
        let _ = record.first_block.set(block);
        record.partial_hash(hasher);
        Ok(record)
    }

    /// Absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inode key, when the platform provides one.
    #[must_use]
    pub fn inode(&self) -> Option<InodeKey> {
        self.inode
    }

    /// Size captured at enrollment.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.snapshot.size
    }

    /// Snapshot captured at enrollment.
    #[must_use]
    pub fn snapshot(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    /// Whether the file changed since enrollment.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.snapshot.is_stale(&self.path)
    }

    /// The first (up to 4096) bytes, or `None` if they could not be read.
    pub fn first_block(&self) -> Option<&[u8]> {
        self.first_block
            .get_or_init(|| load_first_block(&self.path))
            .as_deref()
    }

    /// Hash of the zero-padded first block.
    pub fn partial_hash(&self, hasher: &Hasher) -> Digest {
        *self.partial_hash.get_or_init(|| match self.first_block() {
            Some(block) => Digest::Computed(hasher.hash_block(block)),
            None => Digest::Unavailable,
        })
    }

    /// Hash of the whole file content.
    pub fn full_hash(&self, hasher: &Hasher) -> Digest {
        *self
            .full_hash
            .get_or_init(|| Digest::from(hasher.hash_file(&self.path)))
    }

    /// Whether the full hash has already been computed.
    #[must_use]
    pub fn has_full_hash(&self) -> bool {
        self.full_hash.get().is_some()
    }
}

fn load_first_block(path: &Path) -> Option<Box<[u8]>> {
    match read_first_block(path) {
        Ok(block) => Some(block.into_boxed_slice()),
        Err(e) => {
            log::debug!("First block unavailable: {}", e);
            None
        }
    }
}
