//! Report file creation.
//!
//! The report path must not exist. A path without an extension gets `.json`
//! appended (and the completed path must not exist either); any other
//! extension is rejected. The file is opened with create-new semantics, so
//! an existing file is never truncated even if it appears after the checks.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::json::{JsonOutputError, Report};

/// Required report extension.
pub const REPORT_EXTENSION: &str = "json";

/// Problems with the requested report path.
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    /// The path (or its completed form) already exists.
    #[error("Output file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// The path has an extension other than `.json`.
    #[error("Output file must have a .json extension: {0}")]
    BadExtension(PathBuf),

    /// The file could not be created.
    #[error("Failed to create output file {path}: {source}")]
    Create {
        /// Path that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Apply the report path rules without touching the filesystem beyond
/// existence checks.
///
/// # Errors
///
/// Returns [`OutputError::AlreadyExists`] or [`OutputError::BadExtension`].
pub fn resolve_output_path(requested: &Path) -> Result<PathBuf, OutputError> {
    if occupied(requested) {
        return Err(OutputError::AlreadyExists(requested.to_path_buf()));
    }

    match requested.extension() {
        None => {
            let completed = requested.with_extension(REPORT_EXTENSION);
            if occupied(&completed) {
                return Err(OutputError::AlreadyExists(completed));
            }
            Ok(completed)
        }
        Some(ext) if ext == REPORT_EXTENSION => Ok(requested.to_path_buf()),
        Some(_) => Err(OutputError::BadExtension(requested.to_path_buf())),
    }
}

/// Whether anything, including a dangling symlink, sits at `path`.
fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// An open, freshly created report file.
#[derive(Debug)]
pub struct OutputTarget {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl OutputTarget {
    /// Validate `requested` and create the report file.
    ///
    /// # Errors
    ///
    /// Fails if the path breaks the rules in [`resolve_output_path`] or the
    /// file cannot be created.
    pub fn create(requested: &Path) -> Result<Self, OutputError> {
        let path = resolve_output_path(requested)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| match source.kind() {
                io::ErrorKind::AlreadyExists => OutputError::AlreadyExists(path.clone()),
                _ => OutputError::Create {
                    path: path.clone(),
                    source,
                },
            })?;
        log::debug!("Created report file {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Path of the created file, with any completed extension.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `report`, then flush and close the file.
    ///
    /// A file left incomplete by a failed write is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing or syncing fails.
    pub fn write_report(self, report: &Report, pretty: bool) -> Result<PathBuf, JsonOutputError> {
        let Self { path, mut writer } = self;
        let written = report.write_to(&mut writer, pretty).and_then(|()| {
            let file = writer
                .into_inner()
                .map_err(|e| JsonOutputError::Io(e.into_error()))?;
            file.sync_all()?;
            Ok(())
        });

        match written {
            Ok(()) => Ok(path),
            Err(e) => {
                remove_report(&path);
                Err(e)
            }
        }
    }

    /// Close and remove the file without writing a report.
    pub fn discard(self) {
        let Self { path, writer } = self;
        drop(writer);
        remove_report(&path);
    }
}

fn remove_report(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed unfinished report {}", path.display()),
        Err(e) => log::warn!("Could not remove unfinished report {}: {}", path.display(), e),
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
