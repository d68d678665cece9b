//! Duplicate group assembly.
//!
//! # Overview
//!
//! A [`GroupBuilder`] takes one bucket at a time and partitions its records
//! into groups of verified byte-identical files. Each unchecked record in
//! turn becomes a leader and is compared against every later unchecked
//! record through the [verification ladder](super::compare).
//!
//! Staleness is re-checked right before every comparison. A changed
//! candidate is dropped; a leader that changes mid-scan discards the whole
//! group it was building. Members already collected for a discarded group
//! stay checked and are not offered to a later leader.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{BucketIndex, GroupBuilder};
//! use dupfind::scanner::Hasher;
//!
//! let hasher = Hasher::default();
//! let index = BucketIndex::new();
//! let mut builder = GroupBuilder::new(hasher);
//!
//! let groups: Vec<_> = index
//!     .into_buckets()
//!     .flat_map(|bucket| builder.process(&bucket.records))
//!     .collect();
//! println!("{} groups, {} comparisons", groups.len(), builder.stats().comparisons);
//! ```

use std::path::{Path, PathBuf};

use super::compare::{verify, Verdict};
use crate::scanner::{FileRecord, Hasher};

/// A set of byte-identical files.
///
/// Paths are absolute and appear in the order they joined the group; the
/// first path is the leader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Size of each file in bytes
    pub size: u64,
    /// Member paths, leader first
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a group from its shared size and member paths.
    #[must_use]
    pub fn new(size: u64, paths: Vec<PathBuf>) -> Self {
        Self { size, paths }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of redundant copies (all members but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Bytes freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Whether `path` is a member.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Counters collected while building groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Buckets with 2+ records that were examined
    pub buckets_examined: usize,
    /// Verification ladder runs
    pub comparisons: usize,
    /// Records found changed since enrollment
    pub stale_records: usize,
    /// Comparisons that could not reach a verdict
    pub indeterminate: usize,
    /// Groups dropped because their leader changed
    pub discarded_groups: usize,
    /// Groups emitted
    pub groups: usize,
}

/// Leader-based partitioner for bucket contents.
#[derive(Debug)]
pub struct GroupBuilder {
    hasher: Hasher,
    stats: GroupingStats,
    /// Runs on the leader after each match, to change files between comparisons.
    #[cfg(test)]
    after_match: Option<fn(&FileRecord)>,
}

impl GroupBuilder {
    /// Create a builder that fingerprints with `hasher`.
    #[must_use]
    pub fn new(hasher: Hasher) -> Self {
        Self {
            hasher,
            stats: GroupingStats::default(),
            #[cfg(test)]
            after_match: None,
        }
    }

    /// Counters accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &GroupingStats {
        &self.stats
    }

    /// Consume the builder, returning its counters.
    #[must_use]
    pub fn into_stats(self) -> GroupingStats {
        self.stats
    }

    /// Partition one bucket's records into duplicate groups.
    ///
    /// Buckets with fewer than two records are skipped without any I/O.
    /// Only groups with at least two members are returned, each exactly
    /// once, in leader order.
    pub fn process(&mut self, records: &[FileRecord]) -> Vec<DuplicateGroup> {
        if records.len() < 2 {
            return Vec::new();
        }
        self.stats.buckets_examined += 1;

        let mut checked = vec![false; records.len()];
        let mut groups = Vec::new();

        for i in 0..records.len() {
            if checked[i] {
                continue;
            }
            checked[i] = true;

            let leader = &records[i];
            if leader.has_changed() {
                log::debug!("Skipping changed file: {}", leader.path().display());
                self.stats.stale_records += 1;
                continue;
            }

            if let Some(members) = self.collect_members(records, i, &mut checked) {
                if members.len() > 1 {
                    let paths = members
                        .iter()
                        .map(|&k| records[k].path().to_path_buf())
                        .collect();
                    groups.push(DuplicateGroup::new(leader.size(), paths));
                    self.stats.groups += 1;
                }
            }
        }

        groups
    }

    /// Gather every unchecked record equal to `records[leader]`.
    ///
    /// Returns `None` if the leader changed during the scan.
    fn collect_members(
        &mut self,
        records: &[FileRecord],
        leader: usize,
        checked: &mut [bool],
    ) -> Option<Vec<usize>> {
        let lead = &records[leader];
        let mut members = vec![leader];

        for j in (leader + 1)..records.len() {
            if checked[j] {
                continue;
            }

            let candidate = &records[j];
            if candidate.has_changed() {
                log::debug!("Skipping changed file: {}", candidate.path().display());
                self.stats.stale_records += 1;
                checked[j] = true;
                continue;
            }

            if lead.has_changed() {
                log::debug!(
                    "Leader changed, discarding group of {}: {}",
                    members.len(),
                    lead.path().display()
                );
                self.stats.stale_records += 1;
                self.stats.discarded_groups += 1;
                return None;
            }

            self.stats.comparisons += 1;
            match verify(lead, candidate, &self.hasher) {
                Verdict::Equal => {
                    log::trace!(
                        "{} == {}",
                        lead.path().display(),
                        candidate.path().display()
                    );
                    #[cfg(test)]
                    if let Some(hook) = self.after_match {
                        hook(lead);
                    }
                    members.push(j);
                    checked[j] = true;
                }
                Verdict::Indeterminate => self.stats.indeterminate += 1,
                Verdict::Different(_) => {}
            }
        }

        Some(members)
    }
}
