//! Candidate buckets keyed by (partial hash, size).
//!
//! # Overview
//!
//! Files can only be duplicates if they have the same size and the same
//! first 4 KiB. The [`BucketIndex`] groups enrolled records by exactly that
//! pair. It is filled once during the walk and then drained by the group
//! builder; records are never removed individually.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::BucketIndex;
//! use dupfind::scanner::{Hasher, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let hasher = Hasher::default();
//! let mut index = BucketIndex::new();
//! let mut walker = Walker::new(Path::new("/data"), WalkerConfig::default());
//! walker.for_each_record(&hasher, |record| index.insert(record, &hasher));
//!
//! println!("{} buckets, {} may hold duplicates", index.len(), index.candidate_buckets());
//! ```

use std::collections::BTreeMap;

use crate::scanner::{Digest, FileRecord, Hasher};

/// Bucket key: partial hash and file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    /// Hash of the first block
    pub partial_hash: Digest,
    /// File size in bytes
    pub size: u64,
}

impl BucketKey {
    /// Compute the key for a record.
    #[must_use]
    pub fn of(record: &FileRecord, hasher: &Hasher) -> Self {
        Self {
            partial_hash: record.partial_hash(hasher),
            size: record.size(),
        }
    }
}

/// Records sharing one [`BucketKey`], in insertion order.
#[derive(Debug)]
pub struct Bucket {
    /// Shared key
    pub key: BucketKey,
    /// Records in traversal order
    pub records: Vec<FileRecord>,
}

impl Bucket {
    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the bucket can contain duplicates (2+ records).
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.records.len() > 1
    }
}

/// Insert-only map from [`BucketKey`] to records.
///
/// Iteration follows key order, so a scan of an unchanged tree visits
/// buckets in the same order every run.
#[derive(Debug, Default)]
pub struct BucketIndex {
    buckets: BTreeMap<BucketKey, Vec<FileRecord>>,
    records: usize,
}

impl BucketIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its (partial hash, size) key.
    ///
    /// Reads the first block if the record has not loaded it yet.
    pub fn insert(&mut self, record: FileRecord, hasher: &Hasher) {
        let key = BucketKey::of(&record, hasher);
        self.buckets.entry(key).or_default().push(record);
        self.records += 1;
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no record has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of records across all buckets.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records
    }

    /// Number of buckets with 2+ records.
    #[must_use]
    pub fn candidate_buckets(&self) -> usize {
        self.buckets.values().filter(|v| v.len() > 1).count()
    }

    /// Records in the bucket for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &BucketKey) -> Option<&[FileRecord]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Consume the index, yielding buckets in key order.
    pub fn into_buckets(self) -> impl Iterator<Item = Bucket> {
        self.buckets
            .into_iter()
            .map(|(key, records)| Bucket { key, records })
    }
}
