//! Stat calls turning a discovered path into a [`FileRecord`].
//!
//! These functions are what the worker pool runs during metadata
//! collection. Each call touches one path and shares no state.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use super::{FileIdentity, FileRecord, ScanError};

/// Collect the record for a single path.
///
/// Returns `Ok(None)` for entries that are not regular files or are empty.
///
/// # Errors
///
/// Returns a [`ScanError`] if the path cannot be stat'ed (removed since
/// discovery, permission denied, ...).
pub fn collect_record(path: &Path) -> Result<Option<FileRecord>, ScanError> {
    collect_record_with_identity(path).map(|found| found.map(|(record, _)| record))
}

/// Collect the record for a single path together with its file identity.
///
/// # Errors
///
/// Returns a [`ScanError`] if the path cannot be stat'ed.
pub fn collect_record_with_identity(
    path: &Path,
) -> Result<Option<(FileRecord, Option<FileIdentity>)>, ScanError> {
    let metadata = fs::metadata(path).map_err(|e| {
        log::warn!("Cannot stat {}: {}", path.display(), e);
        ScanError::from_io(path.to_path_buf(), e)
    })?;

    if !metadata.is_file() {
        log::trace!("Not a regular file: {}", path.display());
        return Ok(None);
    }

    let size = metadata.len();
    if size == 0 {
        log::debug!("Skipping empty file: {}", path.display());
        return Ok(None);
    }

    let modified_at = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
    // Not every filesystem records a birth time
    let created_at = metadata.created().unwrap_or(modified_at);

    let record = FileRecord::new(path.to_path_buf(), size, created_at, modified_at);
    Ok(Some((record, FileIdentity::from_metadata(&metadata))))
}
