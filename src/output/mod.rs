//! Report output for scan results.
//!
//! - [`json`]: the `{"items": [[...]]}` report schema
//! - [`target`]: report path rules and create-new file handling
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::DuplicateFinder;
//! use dupfind::output::{OutputTarget, Report};
//! use std::path::Path;
//!
//! let target = OutputTarget::create(Path::new("dupes")).unwrap();
//! let (groups, summary) = DuplicateFinder::with_defaults()
//!     .find_duplicates(Path::new("."))
//!     .unwrap();
//!
//! let written = target
//!     .write_report(&Report::from_groups(&summary.root, &groups), true)
//!     .unwrap();
//! println!("Report saved to {}", written.display());
//! ```

pub mod json;
pub mod target;

// Re-export main types
pub use json::{JsonOutputError, Report, ReportEntry};
pub use target::{resolve_output_path, OutputError, OutputTarget, REPORT_EXTENSION};
