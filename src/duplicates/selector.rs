//! Keep-oldest selection of removable copies.
//!
//! Given digest groups ordered oldest first, the first member of every
//! group survives and every other member is planned for removal, tagged
//! with its survivor.

use std::sync::Arc;

use super::groups::DuplicateGroup;
use crate::scanner::FileRecord;

/// One planned removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalEntry {
    /// Copy to remove
    pub file: FileRecord,
    /// Retained copy of the same digest group
    pub survivor: Arc<FileRecord>,
}

/// Files selected for deletion, each tagged with its survivor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalPlan {
    /// Removable copies in group order
    pub entries: Vec<RemovalEntry>,
    /// One retained copy per group
    pub survivors: Vec<Arc<FileRecord>>,
    /// Members of all digest groups, survivors included
    pub content_duplicates: usize,
}

impl RemovalPlan {
    /// Number of files planned for removal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is planned for removal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of digest groups the plan was built from.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.survivors.len()
    }

    /// Bytes freed if every entry is removed.
    #[must_use]
    pub fn reclaimable_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.file.size).sum()
    }
}

/// Build the removal plan from digest groups.
///
/// Groups are expected to be ordered oldest first, as
/// [`DuplicateGroup::new`] leaves them. Groups with fewer than two members
/// contribute nothing.
///
/// # Example
///
/// ```
/// use dupsweep::duplicates::{select_removals, DuplicateGroup};
/// use dupsweep::scanner::FileRecord;
/// use std::path::PathBuf;
/// use std::time::{Duration, SystemTime};
///
/// let t = |s| SystemTime::UNIX_EPOCH + Duration::from_secs(s);
/// let group = DuplicateGroup::new(
///     "ab12".to_string(),
///     100,
///     vec![
///         FileRecord::new(PathBuf::from("/b.txt"), 100, t(2), t(2)),
///         FileRecord::new(PathBuf::from("/a.txt"), 100, t(1), t(1)),
///     ],
/// );
///
/// let plan = select_removals(vec![group]);
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan.entries[0].file.path, PathBuf::from("/b.txt"));
/// assert_eq!(plan.entries[0].survivor.path, PathBuf::from("/a.txt"));
/// assert_eq!(plan.content_duplicates, 2);
/// ```
#[must_use]
pub fn select_removals(groups: Vec<DuplicateGroup>) -> RemovalPlan {
    let mut plan = RemovalPlan::default();

    for group in groups {
        if group.len() < 2 {
            continue;
        }
        plan.content_duplicates += group.len();

        let mut members = group.files.into_iter();
        let Some(first) = members.next() else {
            continue;
        };
        let survivor = Arc::new(first);
        log::debug!("Keeping {}", survivor.path.display());

        for file in members {
            log::debug!(
                "Marked for removal: {} (copy of {})",
                file.path.display(),
                survivor.path.display()
            );
            plan.entries.push(RemovalEntry {
                file,
                survivor: Arc::clone(&survivor),
            });
        }
        plan.survivors.push(survivor);
    }

    log::info!(
        "Selection complete: {} groups, {} files to remove, {} bytes reclaimable",
        plan.group_count(),
        plan.len(),
        plan.reclaimable_bytes()
    );

    plan
}
