//! Safe file deletion using trash crate.
//!
//! # Overview
//!
//! This module removes the copies selected by the planner:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (explicit mode)
//! - Pre-delete verification against the scan
//! - Cooperative stop between files
//!
//! # Safety
//!
//! Before a copy is deleted its survivor must still exist and the copy must
//! still have the size and modification time recorded by the scan. A copy
//! that fails either check is left on disk and counted as a failure, so at
//! least one copy of every group stays on disk.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::delete_to_trash;
//! use std::path::PathBuf;
//!
//! // Single file deletion to trash
//! let path = PathBuf::from("/path/to/duplicate.txt");
//! match delete_to_trash(&path) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::duplicates::{RemovalEntry, RemovalPlan};
use crate::progress::{ProgressSink, PHASE_REMOVE};
use crate::signal::StopSignal;

/// How removable copies are deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionMode {
    /// Move to the platform trash
    #[default]
    Recoverable,
    /// Unlink
    Permanent,
}

impl DeletionMode {
    /// Whether deletions in this mode cannot be undone.
    #[must_use]
    pub fn is_permanent(self) -> bool {
        matches!(self, Self::Permanent)
    }
}

impl std::fmt::Display for DeletionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recoverable => write!(f, "recoverable"),
            Self::Permanent => write!(f, "permanent"),
        }
    }
}

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// The retained copy of the group is gone.
    #[error("survivor {survivor} no longer exists, keeping {path}")]
    SurvivorMissing { path: PathBuf, survivor: PathBuf },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path of the file that was not deleted.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::Modified(p)
            | Self::SurvivorMissing { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of executing a removal plan.
#[derive(Debug, Clone, Default)]
pub struct RemovalOutcome {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their error messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
    /// The stop signal ended the removals early.
    pub stopped: bool,
}

impl RemovalOutcome {
    /// Number of successful deletions.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all attempted deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut text = if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {} bytes",
                self.removed_count(),
                self.bytes_freed
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {} bytes",
                self.removed_count(),
                self.failed_count(),
                self.bytes_freed
            )
        };
        if self.stopped {
            text.push_str(" (stopped)");
        }
        text
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Trash or unlink.
    pub mode: DeletionMode,
    /// Check survivor and candidate against the scan before each deletion.
    pub verify_before_delete: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            mode: DeletionMode::Recoverable,
            verify_before_delete: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for the given mode with verification on.
    #[must_use]
    pub fn new(mode: DeletionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Enable/disable pre-delete verification.
    #[must_use]
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify_before_delete = verify;
        self
    }
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `PermanentDeleteFailed` if the unlink fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete a single file in the given mode.
///
/// # Errors
///
/// See [`delete_to_trash`] and [`permanent_delete`].
pub fn delete_file(path: &Path, mode: DeletionMode) -> Result<DeleteResult, DeleteError> {
    match mode {
        DeletionMode::Recoverable => delete_to_trash(path),
        DeletionMode::Permanent => permanent_delete(path),
    }
}

/// Check a planned removal against the current file system.
///
/// # Errors
///
/// - `SurvivorMissing` if the retained copy no longer exists
/// - `Modified` if the candidate's size or modification time changed
/// - `NotFound` / `PermissionDenied` / `Io` if the candidate cannot be inspected
pub fn verify_entry(entry: &RemovalEntry) -> Result<(), DeleteError> {
    let path = entry.file.path.as_path();

    if !entry.survivor.path.is_file() {
        log::warn!(
            "Survivor {} missing, not removing {}",
            entry.survivor.path.display(),
            path.display()
        );
        return Err(DeleteError::SurvivorMissing {
            path: path.to_path_buf(),
            survivor: entry.survivor.path.clone(),
        });
    }

    let current = fs::metadata(path).map_err(|e| DeleteError::from_io(path, e))?;

    if current.len() != entry.file.size {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            path.display(),
            entry.file.size,
            current.len()
        );
        return Err(DeleteError::Modified(path.to_path_buf()));
    }

    if let Ok(mtime) = current.modified() {
        if mtime != entry.file.modified_at {
            log::warn!("File modified since scan: {} (mtime changed)", path.display());
            return Err(DeleteError::Modified(path.to_path_buf()));
        }
    }

    Ok(())
}

/// Execute a removal plan.
///
/// Every entry is attempted independently; failures are logged, recorded
/// and do not stop the remaining entries. The stop signal is checked before
/// each file, never during one.
pub fn remove_planned(
    plan: &RemovalPlan,
    config: &DeleteConfig,
    sink: &dyn ProgressSink,
    stop: &StopSignal,
) -> RemovalOutcome {
    let mut outcome = RemovalOutcome::default();
    let total = plan.len();

    sink.on_phase_start(PHASE_REMOVE, total);

    for (index, entry) in plan.entries.iter().enumerate() {
        if stop.is_stop_requested() {
            log::info!("Stop requested, {} removal(s) not attempted", total - index);
            outcome.stopped = true;
            break;
        }

        let path = entry.file.path.as_path();
        let result = if config.verify_before_delete {
            verify_entry(entry).and_then(|()| delete_file(path, config.mode))
        } else {
            delete_file(path, config.mode)
        };

        match result {
            Ok(deleted) => {
                outcome.bytes_freed += deleted.size;
                outcome.successes.push(deleted);
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Failed to remove {}: {}", path.display(), message);
                outcome.failures.push((path.to_path_buf(), message));
            }
        }

        sink.on_progress(index + 1);
    }

    sink.on_phase_end(PHASE_REMOVE);
    log::info!("{}", outcome.summary());

    outcome
}
