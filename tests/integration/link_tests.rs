use dupfind::duplicates::{DuplicateFinder, FinderConfig};
use dupfind::scanner::hardlink::InodeTracker;
use dupfind::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

#[test]
fn test_hardlinks_to_same_file_not_counted_as_duplicates() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let hardlink = dir.path().join("hardlink.txt");

    File::create(&original)
        .unwrap()
        .write_all(b"identical content")
        .unwrap();

    if let Err(e) = fs::hard_link(&original, &hardlink) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    if InodeTracker::is_supported() {
        assert!(groups.is_empty());
        assert_eq!(summary.enrolled, 1);
        assert_eq!(summary.hardlinks_skipped, 1);
    } else {
        assert_eq!(groups.len(), 1);
        assert_eq!(summary.enrolled, 2);
    }
}

#[test]
fn test_hardlink_plus_real_copy() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a.txt");
    let link = dir.path().join("b.txt");
    let copy = dir.path().join("c.txt");

    fs::write(&original, b"linked and copied").unwrap();
    if fs::hard_link(&original, &link).is_err() {
        return;
    }
    fs::write(&copy, b"linked and copied").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    if InodeTracker::is_supported() {
        // One path per inode: the first in traversal order, plus the copy.
        assert_eq!(groups[0].len(), 2);
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(groups[0].paths, vec![root.join("a.txt"), root.join("c.txt")]);
    }
}

#[test]
#[cfg(unix)]
fn test_files_reachable_only_through_symlinks_are_grouped() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();

    fs::write(dir.path().join("a.bin"), b"linked file body").unwrap();
    fs::write(outside.path().join("target.bin"), b"linked file body").unwrap();
    std::os::unix::fs::symlink(outside.path().join("target.bin"), dir.path().join("link.bin"))
        .unwrap();

    fs::write(dir.path().join("b.bin"), b"linked dir body").unwrap();
    fs::create_dir(outside.path().join("far")).unwrap();
    fs::write(outside.path().join("far").join("c.bin"), b"linked dir body").unwrap();
    std::os::unix::fs::symlink(outside.path().join("far"), dir.path().join("linkdir")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let root = dir.path().canonicalize().unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().any(|g| g.paths == vec![root.join("a.bin"), root.join("link.bin")]));
    assert!(groups
        .iter()
        .any(|g| g.paths == vec![root.join("b.bin"), root.join("linkdir").join("c.bin")]));
    assert_eq!(summary.symlinks_skipped, 0);
}

#[test]
#[cfg(unix)]
fn test_symlinks_skipped_when_following_disabled() {
    let dir = tempdir().unwrap();
    let outside = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), b"content").unwrap();
    fs::write(outside.path().join("target.bin"), b"content").unwrap();
    std::os::unix::fs::symlink(outside.path().join("target.bin"), dir.path().join("link.bin"))
        .unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(false, Vec::new()));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.enrolled, 1);
    assert_eq!(summary.symlinks_skipped, 1);
}

#[test]
#[cfg(unix)]
fn test_followed_symlink_deduplicated_by_inode() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    fs::write(&original, b"content").unwrap();
    std::os::unix::fs::symlink(&original, dir.path().join("symlink.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.enrolled, 1);
    assert_eq!(summary.hardlinks_skipped, 1);
}

#[test]
#[cfg(unix)]
fn test_directory_symlink_cycle_terminates() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("a.txt"), b"loop").unwrap();
    fs::write(dir.path().join("b.txt"), b"loop").unwrap();
    std::os::unix::fs::symlink(dir.path(), sub.join("back")).unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(true, Vec::new()));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert_eq!(summary.enrolled, 2);
    assert!(summary.unreadable() >= 1);
}

#[test]
#[cfg(unix)]
fn test_dangling_symlink_ignored() {
    let dir = tempdir().unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();
    fs::write(dir.path().join("real.txt"), b"real").unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(true, Vec::new()));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.enrolled, 1);
}
