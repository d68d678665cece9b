//! Duplicate finder: walk, bucket, verify.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the whole detection pipeline for one root:
//!
//! 1. **Walk**: enroll every eligible file once per inode, reading its first
//!    block and partial hash
//! 2. **Bucket**: index records by (partial hash, size)
//! 3. **Verify**: run the [`GroupBuilder`] over every bucket with 2+ records
//!
//! The run is single-threaded and never retried. Per-entry problems are
//! counted in the [`ScanSummary`]; only setup problems are errors.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let (groups, summary) = finder.find_duplicates(Path::new("/data")).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::bucket::BucketIndex;
use super::groups::{DuplicateGroup, GroupBuilder, GroupingStats};
use crate::progress::{ProgressCallback, PHASE_GROUPING, PHASE_WALKING};
use crate::scanner::{Hasher, ScanError, WalkStats, Walker, WalkerConfig};

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Hash algorithm, seed and chunk size.
    pub hasher: Hasher,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("hasher", &self.hasher)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Canonical scan root; report paths are relative to it
    pub root: PathBuf,
    /// Directories entered, including the root
    pub directories: usize,
    /// Files enrolled as candidates
    pub enrolled: usize,
    /// Dot-named entries skipped
    pub hidden_skipped: usize,
    /// Entries skipped by path exclusion
    pub excluded_skipped: usize,
    /// Symbolic links skipped
    pub symlinks_skipped: usize,
    /// Extra paths to an already enrolled inode
    pub hardlinks_skipped: usize,
    /// Files rejected as empty, irregular or lacking timestamps
    pub ineligible_skipped: usize,
    /// Files whose inode could not be resolved
    pub inode_failures: usize,
    /// Distinct (partial hash, size) buckets
    pub buckets: usize,
    /// Buckets with 2+ records
    pub candidate_buckets: usize,
    /// Pairwise verifications run
    pub comparisons: usize,
    /// Records that changed after enrollment
    pub stale_records: usize,
    /// Comparisons without a verdict
    pub indeterminate: usize,
    /// Groups dropped because their leader changed
    pub discarded_groups: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies (group members beyond the first)
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy per group
    pub reclaimable_space: u64,
    /// Wall time of the scan
    pub scan_duration: Duration,
    /// Non-fatal traversal errors (unreadable directories and the like)
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    fn from_parts(
        root: PathBuf,
        walk: WalkStats,
        buckets: usize,
        candidate_buckets: usize,
        grouping: GroupingStats,
        groups: &[DuplicateGroup],
    ) -> Self {
        Self {
            root,
            directories: walk.directories,
            enrolled: walk.enrolled,
            hidden_skipped: walk.hidden_skipped,
            excluded_skipped: walk.excluded_skipped,
            symlinks_skipped: walk.symlinks_skipped,
            hardlinks_skipped: walk.hardlinks_skipped,
            ineligible_skipped: walk.ineligible_skipped,
            inode_failures: walk.inode_failures,
            buckets,
            candidate_buckets,
            comparisons: grouping.comparisons,
            stale_records: grouping.stale_records,
            indeterminate: grouping.indeterminate,
            discarded_groups: grouping.discarded_groups,
            duplicate_groups: groups.len(),
            duplicate_files: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
            reclaimable_space: groups.iter().map(DuplicateGroup::wasted_space).sum(),
            scan_duration: Duration::ZERO,
            scan_errors: walk.errors,
        }
    }

    /// Entries skipped for any reason.
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.hidden_skipped
            + self.excluded_skipped
            + self.symlinks_skipped
            + self.hardlinks_skipped
            + self.ineligible_skipped
            + self.inode_failures
    }

    /// Number of directories or entries that could not be read.
    #[must_use]
    pub fn unreadable(&self) -> usize {
        self.scan_errors.len()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} groups, {} duplicate files, {} reclaimable \
             ({} dirs, {} files enrolled, {} skipped, {} unreadable, \
             {} buckets, {} comparisons, {} stale) in {:.2?}",
            self.duplicate_groups,
            self.duplicate_files,
            self.reclaimable_display(),
            self.directories,
            self.enrolled,
            self.skipped_total(),
            self.unreadable(),
            self.buckets,
            self.comparisons,
            self.stale_records,
            self.scan_duration,
        )
    }
}

/// Errors that prevent a scan from starting.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be resolved to an absolute path.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Orchestrates walk, bucketing and verification for one root.
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files beneath `path`.
    ///
    /// Group paths are absolute, built from the canonical form of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if the path does not exist, is not a
    /// directory, or cannot be canonicalized.
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }
        let root = path.canonicalize().map_err(|source| FinderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Scanning {}", root.display());
        let hasher = self.config.hasher;
        let progress = self.config.progress_callback.as_deref();

        // Walk and bucket
        if let Some(cb) = progress {
            cb.on_phase_start(PHASE_WALKING, 0);
        }
        let mut index = BucketIndex::new();
        let mut walker = Walker::new(&root, self.config.walker_config.clone());
        walker.for_each_record(&hasher, |record| {
            if let Some(cb) = progress {
                cb.on_progress(index.record_count() + 1, &record.path().to_string_lossy());
            }
            index.insert(record, &hasher);
        });
        let walk = walker.into_stats();
        if let Some(cb) = progress {
            cb.on_phase_end(PHASE_WALKING);
        }

        let buckets = index.len();
        let candidate_buckets = index.candidate_buckets();
        log::debug!(
            "Walk complete: {} files in {} buckets, {} with candidates",
            index.record_count(),
            buckets,
            candidate_buckets
        );

        // Verify
        if let Some(cb) = progress {
            cb.on_phase_start(PHASE_GROUPING, candidate_buckets);
        }
        let mut builder = GroupBuilder::new(hasher);
        let mut groups = Vec::new();
        let mut done = 0;
        for bucket in index.into_buckets().filter(|b| b.has_candidates()) {
            done += 1;
            if let Some(cb) = progress {
                let first = bucket.records[0].path().to_string_lossy();
                cb.on_progress(done, &first);
            }
            groups.extend(builder.process(&bucket.records));
        }
        if let Some(cb) = progress {
            cb.on_phase_end(PHASE_GROUPING);
        }

        let mut summary = ScanSummary::from_parts(
            root,
            walk,
            buckets,
            candidate_buckets,
            builder.into_stats(),
            &groups,
        );
        summary.scan_duration = start_time.elapsed();
        log::info!("Scan complete: {}", summary);

        Ok((groups, summary))
    }
}
