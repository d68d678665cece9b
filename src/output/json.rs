//! JSON report of duplicate groups.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "items": [
//!     [
//!       { "display_path": "a/x.txt", "real_path": "/data/a/x.txt" },
//!       { "display_path": "b/x.txt", "real_path": "/data/b/x.txt" }
//!     ]
//!   ]
//! }
//! ```
//!
//! `display_path` is relative to the scan root, `real_path` is absolute.
//! Groups and their members keep the order in which they were verified.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::DuplicateFinder;
//! use dupfind::output::json::Report;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let report = Report::from_groups(&summary.root, &groups);
//! println!("{}", report.to_json_pretty().unwrap());
//! ```

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::duplicates::DuplicateGroup;

/// One member of a reported group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Path relative to the scan root
    pub display_path: String,
    /// Absolute path
    pub real_path: String,
}

impl ReportEntry {
    /// Build an entry for `path`, found beneath `root`.
    ///
    /// A path outside `root` is shown in full.
    #[must_use]
    pub fn new(root: &Path, path: &Path) -> Self {
        let display = path.strip_prefix(root).unwrap_or(path);
        Self {
            display_path: display.to_string_lossy().into_owned(),
            real_path: path.to_string_lossy().into_owned(),
        }
    }
}

/// Complete report: one inner array per duplicate group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Duplicate groups in emission order
    pub items: Vec<Vec<ReportEntry>>,
}

impl Report {
    /// Render `groups` relative to `root`.
    ///
    /// Groups with fewer than two members are left out.
    ///
    /// # Example
    ///
    /// ```
    /// use dupfind::duplicates::DuplicateGroup;
    /// use dupfind::output::json::Report;
    /// use std::path::{Path, PathBuf};
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     4,
    ///     vec![PathBuf::from("/data/a.txt"), PathBuf::from("/data/sub/b.txt")],
    /// )];
    /// let report = Report::from_groups(Path::new("/data"), &groups);
    ///
    /// assert_eq!(report.items[0][1].display_path, "sub/b.txt");
    /// assert_eq!(report.items[0][1].real_path, "/data/sub/b.txt");
    /// ```
    #[must_use]
    pub fn from_groups(root: &Path, groups: &[DuplicateGroup]) -> Self {
        Self {
            items: groups
                .iter()
                .filter(|g| g.len() > 1)
                .map(|g| g.paths.iter().map(|p| ReportEntry::new(root, p)).collect())
                .collect(),
        }
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the report has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to JSON with two-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report to `writer` and flush it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur while writing the report.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing report: {0}")]
    Io(#[from] std::io::Error),
}
