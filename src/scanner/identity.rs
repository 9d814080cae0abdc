//! File identity tracking so one file reached by two paths is counted once.
//!
//! # Overview
//!
//! When symlinked directories are followed, the same file can be reached
//! through its real path and through the link. Both paths hash identically,
//! and deleting "the duplicate" would delete the only copy. Hardlinks have
//! the same shape. The tracker remembers which files have been seen and
//! reports later occurrences so the scanner keeps only the first path.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Other**: Identity tracking disabled (every path treated as distinct)

use std::collections::HashSet;
use std::fs::Metadata;

/// Platform-specific identity of an on-disk file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    dev: u64,
    ino: u64,
}

impl FileIdentity {
    /// Create an identity from file metadata.
    ///
    /// Returns `None` if the platform doesn't expose inode information.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    /// Create an identity from file metadata.
    ///
    /// Windows metadata doesn't expose a file index without opening a handle,
    /// so identity tracking is disabled there.
    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }
}

/// Remembers seen file identities.
///
/// `IdentityTracker` is NOT thread-safe; the pipeline uses it once, on the
/// orchestrating thread, after the metadata barrier.
#[derive(Debug, Default)]
pub struct IdentityTracker {
    seen: HashSet<FileIdentity>,
}

impl IdentityTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Record an identity, returning `true` the first time it is seen.
    ///
    /// Unknown identities (`None`) are always treated as first occurrences.
    pub fn first_occurrence(&mut self, identity: Option<FileIdentity>) -> bool {
        match identity {
            Some(key) => self.seen.insert(key),
            None => true,
        }
    }

    /// Number of unique identities tracked.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Whether identity tracking works on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}
