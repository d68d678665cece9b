//! Verification ladder for candidate pairs.
//!
//! # Overview
//!
//! Two records from the same bucket are compared cheapest check first,
//! stopping at the first mismatch:
//!
//! 1. Identical paths match trivially
//! 2. Both paths must still be regular files
//! 3. Sizes must be equal
//! 4. First blocks must be byte-equal
//! 5. Full-content hashes must be equal
//! 6. Streamed byte-for-byte comparison, followed by a size re-check
//!
//! Anything that prevents a definite answer (I/O errors, files vanishing or
//! resizing mid-read) yields [`Verdict::Indeterminate`], which callers treat
//! exactly like a mismatch. Nothing is retried.

use std::fs::{self, File};
use std::path::Path;

use crate::scanner::hasher::read_full;
use crate::scanner::{FileRecord, Hasher};

/// Ladder rung at which two files were found to differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// File sizes differ
    Size,
    /// First blocks differ
    FirstBlock,
    /// Full hashes differ
    FullHash,
    /// Streamed content differs
    Content,
}

/// Outcome of comparing two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Byte-identical.
    Equal,
    /// Definitely different.
    Different(Stage),
    /// No reliable answer; treated as not equal.
    Indeterminate,
}

impl Verdict {
    /// Whether the files were verified identical.
    #[must_use]
    pub fn is_match(self) -> bool {
        matches!(self, Verdict::Equal)
    }
}

/// Run the full verification ladder on two records.
///
/// Fingerprints are computed lazily and stay cached on the records.
pub fn verify(leader: &FileRecord, candidate: &FileRecord, hasher: &Hasher) -> Verdict {
    if leader.path() == candidate.path() {
        return Verdict::Equal;
    }

    if !is_regular_file(leader.path()) || !is_regular_file(candidate.path()) {
        log::debug!(
            "Comparison indeterminate, not regular files: {} / {}",
            leader.path().display(),
            candidate.path().display()
        );
        return Verdict::Indeterminate;
    }

    if leader.size() != candidate.size() {
        return Verdict::Different(Stage::Size);
    }

    if leader.first_block() != candidate.first_block() {
        return Verdict::Different(Stage::FirstBlock);
    }

    if leader.full_hash(hasher) != candidate.full_hash(hasher) {
        return Verdict::Different(Stage::FullHash);
    }

    compare_contents(leader.path(), candidate.path(), hasher.chunk_size())
}

/// Compare two files byte for byte in `chunk_size` pieces.
///
/// Sizes are captured before reading and re-checked afterwards; a file that
/// grew or shrank during the comparison makes the result indeterminate.
pub fn compare_contents(a: &Path, b: &Path, chunk_size: usize) -> Verdict {
    if a == b {
        return Verdict::Equal;
    }

    let (size_a, size_b) = match (regular_size(a), regular_size(b)) {
        (Some(sa), Some(sb)) => (sa, sb),
        _ => return Verdict::Indeterminate,
    };
    if size_a != size_b {
        return Verdict::Different(Stage::Size);
    }

    let (mut file_a, mut file_b) = match (File::open(a), File::open(b)) {
        (Ok(fa), Ok(fb)) => (fa, fb),
        (Err(e), _) | (_, Err(e)) => {
            log::debug!("Cannot open for comparison: {}", e);
            return Verdict::Indeterminate;
        }
    };

    let chunk_size = chunk_size.max(1);
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        let n_a = match read_full(&mut file_a, &mut buf_a) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Read failed for {}: {}", a.display(), e);
                return Verdict::Indeterminate;
            }
        };
        let n_b = match read_full(&mut file_b, &mut buf_b) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("Read failed for {}: {}", b.display(), e);
                return Verdict::Indeterminate;
            }
        };

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Verdict::Different(Stage::Content);
        }
        if n_a == 0 {
            break;
        }
    }

    if regular_size(a) != Some(size_a) || regular_size(b) != Some(size_b) {
        log::debug!(
            "Size changed during comparison: {} / {}",
            a.display(),
            b.display()
        );
        return Verdict::Indeterminate;
    }

    Verdict::Equal
}

fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

fn regular_size(path: &Path) -> Option<u64> {
    fs::metadata(path)
        .ok()
        .filter(fs::Metadata::is_file)
        .map(|m| m.len())
}
