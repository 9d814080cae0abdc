//! Size grouping and digest grouping of file records.
//!
//! # Overview
//!
//! Duplicate detection runs in two stages:
//!
//! 1. **By size** ([`group_by_size`]): files with different sizes cannot be
//!    duplicates, so only size groups with two or more members go on to be
//!    hashed. No file I/O is performed.
//! 2. **By digest** ([`group_by_digest`]): hashed records are repartitioned
//!    by `(size, digest)`. Groups with two or more members are confirmed
//!    duplicates, ordered oldest first.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileRecord;
//! use dupsweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let now = SystemTime::now();
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024, now, now),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024, now, now),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048, now, now),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileRecord;

/// A group of files with the same size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeGroup {
    /// File size in bytes (shared by all files in this group)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRecord>,
}

impl SizeGroup {
    /// Create a size group with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this group has potential duplicates (2+ files).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Confirmed group of files with identical content.
///
/// Members are ordered oldest first (see [`FileRecord::age_cmp`]); the first
/// member is the survivor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Content digest shared by every member (lowercase hex)
    pub digest: String,
    /// File size in bytes
    pub size: u64,
    /// Members, oldest first
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a duplicate group, ordering the members oldest first.
    #[must_use]
    pub fn new(digest: String, size: u64, mut files: Vec<FileRecord>) -> Self {
        files.sort_by(FileRecord::age_cmp);
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The copy that is kept: the oldest member.
    #[must_use]
    pub fn survivor(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Every member except the survivor.
    #[must_use]
    pub fn removable(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.removable().len() as u64
    }

    /// Paths of all members, oldest first.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the size grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Statistics from the digest grouping stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestStats {
    /// Records that carried a digest
    pub hashed_files: usize,
    /// Records skipped because they had no digest (hashing failed)
    pub unhashed_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Members of all confirmed groups, survivors included
    pub duplicate_files: usize,
    /// Bytes held by removable copies
    pub wasted_space: u64,
}

/// Group files by size.
///
/// Returns only groups with two or more files, sorted by size descending
/// (largest potential savings first), with members in input order.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::FileRecord;
/// use dupsweep::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let now = SystemTime::now();
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100, now, now),
///     FileRecord::new(PathBuf::from("/b.txt"), 100, now, now),
///     FileRecord::new(PathBuf::from("/c.txt"), 200, now, now),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(files: impl IntoIterator<Item = FileRecord>) -> (Vec<SizeGroup>, GroupingStats) {
    let mut all_groups: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        all_groups.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = all_groups.len();

    let mut groups: Vec<SizeGroup> = all_groups
        .into_iter()
        .filter_map(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
                None
            } else {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                log::debug!("Size group {} bytes: {} potential duplicates", size, files.len());
                Some(SizeGroup::with_files(size, files))
            }
        })
        .collect();

    groups.sort_by(|a, b| b.size.cmp(&a.size));

    log::info!(
        "Size grouping complete: {} files → {} potential duplicates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (groups, stats)
}

/// Group hashed records by content.
///
/// Records are keyed by `(size, digest)`, so only records that already
/// collided on size can meet. Records without a digest are counted and
/// dropped. Returns groups with two or more members, each ordered oldest
/// first, the groups sorted by size descending then survivor path.
#[must_use]
pub fn group_by_digest(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<DuplicateGroup>, DigestStats) {
    let mut by_content: HashMap<(u64, String), Vec<FileRecord>> = HashMap::new();
    let mut stats = DigestStats::default();

    for file in files {
        let Some(digest) = file.digest().map(str::to_owned) else {
            stats.unhashed_files += 1;
            log::debug!("No digest, excluded from duplicates: {}", file.path.display());
            continue;
        };
        stats.hashed_files += 1;
        by_content.entry((file.size, digest)).or_default().push(file);
    }

    let mut groups: Vec<DuplicateGroup> = by_content
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|((size, digest), files)| {
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                digest,
                files.len(),
                size
            );
            DuplicateGroup::new(digest, size, files)
        })
        .collect();

    groups.sort_by(|a, b| {
        b.size
            .cmp(&a.size)
            .then_with(|| a.files[0].path.cmp(&b.files[0].path))
    });

    stats.duplicate_groups = groups.len();
    stats.duplicate_files = groups.iter().map(DuplicateGroup::len).sum();
    stats.wasted_space = groups.iter().map(DuplicateGroup::wasted_space).sum();

    log::info!(
        "Digest grouping complete: {} groups, {} files, {} bytes reclaimable",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_space
    );

    (groups, stats)
}
