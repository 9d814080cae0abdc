//! Duplicate removal pipeline.
//!
//! # Overview
//!
//! [`Pipeline::run`] drives one run through strictly ordered stages:
//!
//! 1. **Scan**: enumerate regular files under the root
//! 2. **Metadata**: stat every path on the worker pool
//! 3. **Size grouping**: keep only sizes shared by two or more files
//! 4. **Hashing**: digest every size duplicate on the worker pool
//! 5. **Digest grouping**: confirm duplicates by `(size, digest)`
//! 6. **Selection**: keep the oldest copy of every group
//! 7. **Removal**: delete the rest, unless this is a dry run
//!
//! Each stage completes before the next starts. The stop signal is checked
//! between stages and between removals; a stop yields
//! [`RunError::Cancelled`] carrying the counts gathered so far.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::DeletionMode;
//! use dupsweep::pipeline;
//! use dupsweep::signal::StopSignal;
//! use std::path::Path;
//!
//! let sink = |line: &str| println!("{line}");
//! let summary = pipeline::run(
//!     Path::new("/data/photos"),
//!     DeletionMode::Recoverable,
//!     &sink,
//!     &StopSignal::new(),
//! )?;
//! println!("{summary}");
//! # Ok::<(), dupsweep::pipeline::RunError>(())
//! ```

pub mod pool;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use thiserror::Error;

use crate::actions::{remove_planned, DeleteConfig, DeletionMode};
use crate::duplicates::{group_by_digest, group_by_size, select_removals};
use crate::progress::{ProgressSink, PHASE_HASH, PHASE_METADATA, PHASE_SCAN};
use crate::scanner::{
    collect_record_with_identity, FileRecord, HashAlgorithm, Hasher, IdentityTracker, Walker,
    WalkerConfig,
};
use crate::signal::StopSignal;

pub use pool::{default_worker_count, WorkerPool, PARALLEL_THRESHOLD};

/// Counts produced once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Regular, non-empty files scanned
    pub total_files: usize,
    /// Files sharing their size with at least one other file
    pub size_duplicates: usize,
    /// Number of size groups with two or more files
    pub size_groups: usize,
    /// Members of confirmed duplicate groups, survivors included
    pub content_duplicates: usize,
    /// Number of confirmed duplicate groups
    pub content_groups: usize,
    /// Copies removed
    pub removed: usize,
    /// Copies whose removal failed or was refused by verification
    pub failed_removals: usize,
    /// Size duplicates that could not be hashed
    pub hash_failures: usize,
    /// Entries skipped during the scan
    pub scan_errors: usize,
    /// Bytes freed, or bytes that would be freed in a dry run
    pub bytes_freed: u64,
    /// Nothing was deleted on purpose
    pub dry_run: bool,
    /// The run ended on a stop request
    pub stopped: bool,
    /// Wall time of the run
    pub duration: Duration,
}

impl ScanSummary {
    /// Whether any confirmed duplicates were found.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.content_groups > 0
    }

    /// Whether some removals failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.failed_removals > 0
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total files: {}", self.total_files)?;
        writeln!(
            f,
            "Size duplicates: {} files in {} groups",
            self.size_duplicates, self.size_groups
        )?;
        writeln!(
            f,
            "Content duplicates: {} files in {} groups",
            self.content_duplicates, self.content_groups
        )?;
        if self.dry_run {
            writeln!(f, "Would free: {}", ByteSize::b(self.bytes_freed))?;
        } else {
            writeln!(
                f,
                "Removed: {} ({} failed), freed {}",
                self.removed,
                self.failed_removals,
                ByteSize::b(self.bytes_freed)
            )?;
        }
        if self.hash_failures > 0 || self.scan_errors > 0 {
            writeln!(
                f,
                "Skipped: {} unreadable, {} unhashable",
                self.scan_errors, self.hash_failures
            )?;
        }
        if self.stopped {
            writeln!(f, "Stopped before completion")?;
        }
        write!(f, "Elapsed: {:.2?}", self.duration)
    }
}

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The root path does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The root path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root could not be inspected.
    #[error("Cannot access {path}: {source}")]
    Io {
        /// Root path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Traversal yielded no eligible files.
    #[error("No files found under {0}")]
    NoFiles(PathBuf),

    /// A stop request was observed.
    #[error("Run stopped after {} files scanned", .summary.total_files)]
    Cancelled {
        /// Counts gathered before the stop
        summary: Box<ScanSummary>,
    },
}

impl RunError {
    /// Whether the run ended on a stop request.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Counts gathered before a stop request.
    #[must_use]
    pub fn partial_summary(&self) -> Option<&ScanSummary> {
        match self {
            Self::Cancelled { summary } => Some(summary),
            _ => None,
        }
    }
}

/// Settings for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Trash or unlink
    pub deletion_mode: DeletionMode,
    /// Content digest algorithm
    pub hash_algorithm: HashAlgorithm,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
    /// Worker threads for metadata and hashing
    pub workers: usize,
    /// Inputs up to this size run on the calling thread
    pub parallel_threshold: usize,
    /// Check survivor and candidate before each deletion
    pub verify_before_delete: bool,
    /// Plan only, delete nothing
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            deletion_mode: DeletionMode::Recoverable,
            hash_algorithm: HashAlgorithm::Blake3,
            follow_symlinks: false,
            workers: default_worker_count(),
            parallel_threshold: PARALLEL_THRESHOLD,
            verify_before_delete: true,
            dry_run: false,
        }
    }
}

impl PipelineConfig {
    /// Set the deletion mode.
    #[must_use]
    pub fn with_deletion_mode(mut self, mode: DeletionMode) -> Self {
        self.deletion_mode = mode;
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Follow symlinked directories.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set the worker count (at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Set the inline threshold.
    #[must_use]
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Enable/disable pre-delete verification.
    #[must_use]
    pub fn with_verify_before_delete(mut self, verify: bool) -> Self {
        self.verify_before_delete = verify;
        self
    }

    /// Enable/disable dry run.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Reusable pipeline owning its worker pool.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    pool: WorkerPool,
    hasher: Hasher,
}

impl Pipeline {
    /// Create a pipeline and its worker pool.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        let pool = WorkerPool::new(config.workers, config.parallel_threshold);
        let hasher = Hasher::new().with_algorithm(config.hash_algorithm);
        Self {
            config,
            pool,
            hasher,
        }
    }

    /// The configuration this pipeline was built with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on `root`.
    ///
    /// Blocks until the run completes or a stop request is observed.
    /// Progress lines are pushed to `sink`; nothing is written to stdout.
    ///
    /// # Errors
    ///
    /// - [`RunError::NotFound`] / [`RunError::NotADirectory`] / [`RunError::Io`]
    ///   if the root is unusable
    /// - [`RunError::NoFiles`] if no eligible file was found
    /// - [`RunError::Cancelled`] if `stop` was raised, with the partial counts
    pub fn run(
        &self,
        root: &Path,
        sink: &dyn ProgressSink,
        stop: &StopSignal,
    ) -> Result<ScanSummary, RunError> {
        let started = Instant::now();
        check_root(root)?;

        let mut summary = ScanSummary {
            dry_run: self.config.dry_run,
            ..ScanSummary::default()
        };

        log::info!("Scanning {} with {} worker(s)", root.display(), self.pool.workers());

        // Stages 1-2: enumerate, then stat on the pool
        let records = self.scan(root, sink, stop, &mut summary);
        sink.on_message(&format!("Total files: {}", summary.total_files));
        log::info!("Phase 1 complete: {} files scanned", summary.total_files);

        if stop.is_stop_requested() {
            return Err(cancelled(summary, started));
        }
        if records.is_empty() {
            return Err(RunError::NoFiles(root.to_path_buf()));
        }

        // Stage 3: size grouping
        let (size_groups, size_stats) = group_by_size(records);
        summary.size_duplicates = size_stats.potential_duplicates;
        summary.size_groups = size_stats.duplicate_groups;
        sink.on_message(&format!(
            "Size duplicates: {} files in {} groups",
            summary.size_duplicates, summary.size_groups
        ));

        if stop.is_stop_requested() {
            return Err(cancelled(summary, started));
        }
        if size_groups.is_empty() {
            sink.on_message("No duplicates found");
            return Ok(finish(summary, started));
        }

        // Stage 4: hash every size duplicate
        let candidates: Vec<FileRecord> = size_groups.into_iter().flat_map(|g| g.files).collect();
        let hashed = self.hash(candidates, sink);

        if stop.is_stop_requested() {
            return Err(cancelled(summary, started));
        }

        // Stage 5: confirm by digest
        let (groups, digest_stats) = group_by_digest(hashed);
        summary.hash_failures = digest_stats.unhashed_files;
        summary.content_groups = digest_stats.duplicate_groups;
        summary.content_duplicates = digest_stats.duplicate_files;
        sink.on_message(&format!(
            "Content duplicates: {} files in {} groups",
            summary.content_duplicates, summary.content_groups
        ));

        // Stage 6: keep oldest
        let plan = select_removals(groups);

        if stop.is_stop_requested() {
            return Err(cancelled(summary, started));
        }
        if plan.is_empty() {
            sink.on_message("No duplicates found");
            return Ok(finish(summary, started));
        }

        if self.config.dry_run {
            for entry in &plan.entries {
                sink.on_message(&format!(
                    "Would remove: {} (copy of {})",
                    entry.file.path.display(),
                    entry.survivor.path.display()
                ));
            }
            summary.bytes_freed = plan.reclaimable_bytes();
            sink.on_message(&format!("Dry run: {} files would be removed", plan.len()));
            return Ok(finish(summary, started));
        }

        // Stage 7: removal
        let delete_config = DeleteConfig::new(self.config.deletion_mode)
            .with_verify(self.config.verify_before_delete);
        let outcome = remove_planned(&plan, &delete_config, sink, stop);
        summary.removed = outcome.removed_count();
        summary.failed_removals = outcome.failed_count();
        summary.bytes_freed = outcome.bytes_freed;
        sink.on_message(&format!(
            "Removed: {} files ({} failed)",
            summary.removed, summary.failed_removals
        ));

        if outcome.stopped {
            return Err(cancelled(summary, started));
        }

        Ok(finish(summary, started))
    }

    fn scan(
        &self,
        root: &Path,
        sink: &dyn ProgressSink,
        stop: &StopSignal,
        summary: &mut ScanSummary,
    ) -> Vec<FileRecord> {
        sink.on_phase_start(PHASE_SCAN, 0);
        let walker = Walker::new(root, WalkerConfig::new(self.config.follow_symlinks))
            .with_stop_signal(stop.clone());

        let mut paths = Vec::new();
        for entry in walker.walk() {
            match entry {
                Ok(path) => {
                    paths.push(path);
                    sink.on_progress(paths.len());
                }
                Err(e) => {
                    log::warn!("Skipping entry: {}", e);
                    summary.scan_errors += 1;
                }
            }
        }
        sink.on_phase_end(PHASE_SCAN);

        // Paths found so far; replaced by the record count once metadata is in
        summary.total_files = paths.len();
        if stop.is_stop_requested() {
            return Vec::new();
        }

        sink.on_phase_start(PHASE_METADATA, paths.len());
        let done = AtomicUsize::new(0);
        let collected = self.pool.map_chunks(paths, |path| {
            let result = collect_record_with_identity(&path);
            sink.on_progress(done.fetch_add(1, Ordering::Relaxed) + 1);
            result
        });
        sink.on_phase_end(PHASE_METADATA);

        // Without followed symlinks every path is its own file
        let mut identities = self
            .config
            .follow_symlinks
            .then(|| IdentityTracker::with_capacity(collected.len()));
        let mut records = Vec::with_capacity(collected.len());
        for result in collected {
            match result {
                Ok(Some((record, identity))) => {
                    let first = identities
                        .as_mut()
                        .map_or(true, |seen| seen.first_occurrence(identity));
                    if first {
                        records.push(record);
                    } else {
                        log::debug!("Already seen via another path: {}", record.path.display());
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Skipping file: {}", e);
                    summary.scan_errors += 1;
                }
            }
        }
        summary.total_files = records.len();
        records
    }

    fn hash(&self, candidates: Vec<FileRecord>, sink: &dyn ProgressSink) -> Vec<FileRecord> {
        log::info!(
            "Hashing {} files with {}",
            candidates.len(),
            self.hasher.algorithm()
        );
        sink.on_phase_start(PHASE_HASH, candidates.len());

        let done = AtomicUsize::new(0);
        let hasher = self.hasher;
        let hashed = self.pool.map_chunks(candidates, |mut record| {
            match hasher.full_hash(&record.path) {
                Ok(digest) => {
                    record.set_digest(digest);
                }
                Err(e) => log::warn!("Failed to hash: {}", e),
            }
            sink.on_progress(done.fetch_add(1, Ordering::Relaxed) + 1);
            record
        });

        sink.on_phase_end(PHASE_HASH);
        hashed
    }
}

/// Run the pipeline with default settings and the given deletion mode.
///
/// # Errors
///
/// See [`Pipeline::run`].
pub fn run(
    root: &Path,
    deletion_mode: DeletionMode,
    sink: &dyn ProgressSink,
    stop: &StopSignal,
) -> Result<ScanSummary, RunError> {
    Pipeline::new(PipelineConfig::default().with_deletion_mode(deletion_mode)).run(root, sink, stop)
}

fn check_root(root: &Path) -> Result<(), RunError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RunError::NotFound(root.to_path_buf()),
        _ => RunError::Io {
            path: root.to_path_buf(),
            source: e,
        },
    })?;
    if !metadata.is_dir() {
        return Err(RunError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

fn finish(mut summary: ScanSummary, started: Instant) -> ScanSummary {
    summary.duration = started.elapsed();
    log::info!(
        "Run complete: {} removed, {} failed, {} bytes",
        summary.removed,
        summary.failed_removals,
        summary.bytes_freed
    );
    summary
}

fn cancelled(mut summary: ScanSummary, started: Instant) -> RunError {
    summary.stopped = true;
    summary.duration = started.elapsed();
    log::info!("Run stopped after {} files scanned", summary.total_files);
    RunError::Cancelled {
        summary: Box::new(summary),
    }
}
