use dupfind::duplicates::{BucketIndex, DuplicateFinder, FinderConfig, GroupBuilder};
use dupfind::progress::{ProgressCallback, PHASE_GROUPING};
use dupfind::scanner::{Hasher, Walker, WalkerConfig};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

/// What to do to a file once the walk is over.
#[derive(Debug, Clone, Copy)]
enum Tamper {
    Touch,
    Append,
    Remove,
}

/// Progress sink that tampers with one file when grouping starts.
struct TamperOnGrouping {
    target: PathBuf,
    action: Tamper,
}

impl TamperOnGrouping {
    fn apply(&self) {
        match self.action {
            Tamper::Touch => {
                filetime::set_file_mtime(&self.target, FileTime::from_unix_time(1_000_000_000, 0))
                    .unwrap()
            }
            Tamper::Append => {
                let mut content = fs::read(&self.target).unwrap();
                content.extend_from_slice(b" and more");
                fs::write(&self.target, content).unwrap();
            }
            Tamper::Remove => fs::remove_file(&self.target).unwrap(),
        }
    }
}

impl ProgressCallback for TamperOnGrouping {
    fn on_phase_start(&self, phase: &str, _total: usize) {
        if phase == PHASE_GROUPING {
            self.apply();
        }
    }

    fn on_progress(&self, _current: usize, _path: &str) {}

    fn on_phase_end(&self, _phase: &str) {}
}

fn scan_with_tamper(root: &Path, target: &Path, action: Tamper) -> Vec<Vec<PathBuf>> {
    let callback = TamperOnGrouping {
        target: target.to_path_buf(),
        action,
    };
    let config = FinderConfig::default().with_progress_callback(Arc::new(callback));
    let (groups, _) = DuplicateFinder::new(config).find_duplicates(root).unwrap();
    groups.into_iter().map(|g| g.paths).collect()
}

fn names(groups: &[Vec<PathBuf>]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|paths| {
            paths
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        })
        .collect()
}

#[test]
fn test_touched_candidate_left_out() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"triplet").unwrap();
    }

    let groups = scan_with_tamper(dir.path(), &dir.path().join("b"), Tamper::Touch);
    assert_eq!(names(&groups), vec![vec!["a", "c"]]);
}

#[test]
fn test_rewritten_candidate_left_out() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"triplet").unwrap();
    }

    let groups = scan_with_tamper(dir.path(), &dir.path().join("c"), Tamper::Append);
    assert_eq!(names(&groups), vec![vec!["a", "b"]]);
}

#[test]
fn test_removed_candidate_left_out() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"triplet").unwrap();
    }

    let groups = scan_with_tamper(dir.path(), &dir.path().join("b"), Tamper::Remove);
    assert_eq!(names(&groups), vec![vec!["a", "c"]]);
}

#[test]
fn test_touched_leader_hands_over() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"triplet").unwrap();
    }

    // The next unchecked record leads the remaining pair.
    let groups = scan_with_tamper(dir.path(), &dir.path().join("a"), Tamper::Touch);
    assert_eq!(names(&groups), vec![vec!["b", "c"]]);
}

#[test]
fn test_pair_with_one_stale_member_yields_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"pair").unwrap();
    fs::write(dir.path().join("b"), b"pair").unwrap();

    let groups = scan_with_tamper(dir.path(), &dir.path().join("b"), Tamper::Touch);
    assert!(groups.is_empty());
}

#[test]
fn test_stale_file_does_not_affect_other_buckets() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a1"), b"alpha").unwrap();
    fs::write(dir.path().join("a2"), b"alpha").unwrap();
    fs::write(dir.path().join("b1"), b"bravo!").unwrap();
    fs::write(dir.path().join("b2"), b"bravo!").unwrap();

    let groups = scan_with_tamper(dir.path(), &dir.path().join("a2"), Tamper::Remove);
    assert_eq!(names(&groups), vec![vec!["b1", "b2"]]);
}

#[test]
fn test_grouping_stats_count_stale_records() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c", "d"] {
        fs::write(dir.path().join(name), b"quad").unwrap();
    }

    let hasher = Hasher::default();
    let mut walker = Walker::new(dir.path(), WalkerConfig::default());
    let mut index = BucketIndex::new();
    for record in walker.collect_records(&hasher) {
        index.insert(record, &hasher);
    }
    assert_eq!(index.candidate_buckets(), 1);

    filetime::set_file_mtime(dir.path().join("b"), FileTime::from_unix_time(1_000_000_000, 0))
        .unwrap();
    fs::remove_file(dir.path().join("d")).unwrap();

    let mut builder = GroupBuilder::new(hasher);
    let groups: Vec<_> = index
        .into_buckets()
        .flat_map(|bucket| builder.process(&bucket.records))
        .collect();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(builder.stats().stale_records, 2);
    assert_eq!(builder.stats().groups, 1);
}
