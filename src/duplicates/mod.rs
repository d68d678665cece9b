//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Bucketing enrolled files by (partial hash, size)
//! - The cheapest-first verification ladder
//! - Staleness-aware group assembly
//! - The end-to-end [`DuplicateFinder`]

pub mod bucket;
pub mod compare;
pub mod finder;
pub mod groups;

pub use bucket::{Bucket, BucketIndex, BucketKey};
pub use compare::{compare_contents, verify, Stage, Verdict};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{DuplicateGroup, GroupBuilder, GroupingStats};
