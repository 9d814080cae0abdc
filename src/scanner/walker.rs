//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and discovering candidate file paths. Metadata is collected later,
//! on the worker pool, by [`super::metadata`].
//!
//! # Features
//!
//! - Hidden and system directories (names starting with `.` or `$`) are
//!   pruned without being descended into
//! - Configurable symlink following with cycle detection
//! - Per-entry errors are yielded, never fatal
//! - Graceful stop via [`StopSignal`]
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let paths: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} candidate files", paths.len());
//! ```

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{ScanError, WalkerConfig};
use crate::signal::StopSignal;

/// Directory name prefixes that mark hidden or system folders.
pub const SKIPPED_DIR_PREFIXES: [char; 2] = ['.', '$'];

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional stop signal for graceful termination
    stop: Option<StopSignal>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            stop: None,
        }
    }

    /// Set the stop signal.
    ///
    /// When the signal is raised the walker ends iteration at the next
    /// entry. Callers must check the signal themselves to tell a stopped
    /// walk from a finished one.
    #[must_use]
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    fn is_stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(StopSignal::is_stop_requested)
    }

    /// Walk the directory tree, yielding paths of non-directory entries.
    ///
    /// Symlinked files are never yielded: the file they point to is either
    /// inside the tree (and found under its own path) or outside it.
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        walk_dir
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry))
            .take_while(move |_| {
                if self.is_stop_requested() {
                    log::debug!("Walker: Stop requested, ending iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        return None;
                    }
                    if entry.path_is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }
                    Some(Ok(entry.into_path()))
                }
                Err(e) => Some(Err(self.convert_error(e))),
            })
    }

    fn convert_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            log::warn!(
                "Skipping symlink loop: {} -> {}",
                path.display(),
                ancestor.display()
            );
            return ScanError::Loop {
                ancestor: ancestor.to_path_buf(),
                path,
            };
        }

        log::warn!("Walker error for {}: {}", path.display(), error);
        match error.into_io_error() {
            Some(io) => ScanError::from_io(path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("directory walk failed"),
            },
        }
    }
}

/// Whether an entry is a directory whose name marks it hidden or system.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let skipped = entry
        .file_name()
        .to_string_lossy()
        .starts_with(SKIPPED_DIR_PREFIXES);
    if skipped {
        log::debug!("Skipping hidden/system directory: {}", entry.path().display());
    }
    skipped
}
