//! Scanner module for directory traversal, metadata collection and file hashing.
//!
//! This module provides functionality for:
//! - Recursive directory walking using walkdir
//! - Per-file metadata collection into [`FileRecord`] values
//! - Whole-file content hashing (BLAKE3 or SHA-256)
//! - File identity tracking so one file reached twice is counted once
//!
//! # Architecture
//!
//! - [`walker`]: Directory traversal and path discovery
//! - [`metadata`]: Stat calls turning a discovered path into a [`FileRecord`]
//! - [`hasher`]: Streaming content digest
//! - [`identity`]: (device, inode) tracking
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{collect_record, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry.and_then(|path| collect_record(&path)) {
//!         Ok(Some(record)) => println!("{}: {} bytes", record.path.display(), record.size),
//!         Ok(None) => {}
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod identity;
pub mod metadata;
pub mod walker;

use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::SystemTime;

pub use hasher::{HashAlgorithm, Hasher};
pub use identity::{FileIdentity, IdentityTracker};
pub use metadata::{collect_record, collect_record_with_identity};
pub use walker::Walker;

/// Metadata for a discovered regular file.
///
/// Everything except the digest is fixed at creation. The digest is only
/// computed for files that share their size with another file, and it is
/// assigned at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file, unique within one scan
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation (birth) time, or the modification time where unsupported
    pub created_at: SystemTime,
    /// Last modification time
    pub modified_at: SystemTime,
    digest: Option<String>,
}

impl FileRecord {
    /// Create a new record without a digest.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, created_at: SystemTime, modified_at: SystemTime) -> Self {
        Self {
            path,
            size,
            created_at,
            modified_at,
            digest: None,
        }
    }

    /// Content digest as lowercase hex, if it has been computed.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Assign the content digest.
    ///
    /// Returns `false` and leaves the record untouched if a digest was
    /// already set.
    pub fn set_digest(&mut self, digest: String) -> bool {
        if self.digest.is_some() {
            log::debug!("Digest already assigned for {}", self.path.display());
            return false;
        }
        self.digest = Some(digest);
        true
    }

    /// Keep-oldest ordering: creation time, then modification time, then path.
    ///
    /// The earliest record under this ordering is the survivor of its
    /// duplicate group.
    #[must_use]
    pub fn age_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.modified_at.cmp(&other.modified_at))
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Descend into symbolically linked directories.
    /// Directory cycles are detected and skipped.
    pub follow_symlinks: bool,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

/// Errors that can occur for a single entry during scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The entry disappeared between discovery and access.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// Following a symlink led back to one of its ancestors.
    #[error("Symlink loop detected: {path} points back to {ancestor}")]
    Loop {
        /// Path of the link that closes the cycle
        path: PathBuf,
        /// Ancestor directory it resolves to
        ancestor: PathBuf,
    },

    /// An I/O error occurred while accessing an entry.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file was removed between scan and hash.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}
