//! Statically partitioned worker pool.
//!
//! # Overview
//!
//! [`WorkerPool`] runs one function over a list of items. The list is split
//! into contiguous chunks, one per worker, and each worker walks its chunk
//! sequentially. There is no work stealing between chunks, so a chunk full of
//! large files can straggle; the gain is that every worker owns a disjoint
//! slice of records until the barrier at the end of [`WorkerPool::map_chunks`].
//!
//! Inputs at or below the parallel threshold run on the calling thread.

use rayon::prelude::*;

/// Inputs with at most this many items are processed on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 32;

/// Default worker count: logical CPUs minus two, at least one.
#[must_use]
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map_or(1, std::num::NonZeroUsize::get)
        .saturating_sub(2)
        .max(1)
}

/// Split `items` into `parts` contiguous chunks whose lengths differ by at
/// most one, longer chunks first.
///
/// # Example
///
/// ```
/// use dupsweep::pipeline::pool::split_contiguous;
///
/// let chunks = split_contiguous((0..7).collect::<Vec<_>>(), 3);
/// assert_eq!(chunks, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
/// ```
#[must_use]
pub fn split_contiguous<T>(items: Vec<T>, parts: usize) -> Vec<Vec<T>> {
    let parts = parts.clamp(1, items.len().max(1));
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut chunks = Vec::with_capacity(parts);
    let mut iter = items.into_iter();
    for index in 0..parts {
        let len = base + usize::from(index < extra);
        chunks.push(iter.by_ref().take(len).collect());
    }
    chunks
}

/// Bounded pool of workers reused across pipeline stages.
pub struct WorkerPool {
    workers: usize,
    threshold: usize,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .field("threshold", &self.threshold)
            .field("pool", &self.pool.as_ref().map(|_| "<rayon>"))
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool with `workers` threads.
    ///
    /// A single worker needs no threads at all. If the thread pool cannot be
    /// built the pool degrades to running everything on the calling thread.
    #[must_use]
    pub fn new(workers: usize, threshold: usize) -> Self {
        let workers = workers.max(1);
        let pool = if workers > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("dupsweep-worker-{i}"))
                .build()
            {
                Ok(pool) => Some(pool),
                Err(e) => {
                    log::warn!("Failed to create worker pool, running single-threaded: {e}");
                    None
                }
            }
        } else {
            None
        };

        Self {
            workers,
            threshold,
            pool,
        }
    }

    /// Configured number of workers.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of chunks `len` items would be split into.
    #[must_use]
    pub fn chunk_count(&self, len: usize) -> usize {
        if len <= self.threshold || self.pool.is_none() {
            1
        } else {
            self.workers.min(len)
        }
    }

    /// Apply `f` to every item and return the results in input order.
    ///
    /// Blocks until every chunk has been processed.
    pub fn map_chunks<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let chunks = self.chunk_count(items.len());
        let pool = match &self.pool {
            Some(pool) if chunks > 1 => pool,
            _ => return items.into_iter().map(f).collect(),
        };

        log::trace!("Dispatching {} items over {} chunks", items.len(), chunks);
        let partitions = split_contiguous(items, chunks);
        let results: Vec<Vec<R>> = pool.install(|| {
            partitions
                .into_par_iter()
                .map(|chunk| chunk.into_iter().map(&f).collect())
                .collect()
        });

        let mut merged = Vec::with_capacity(results.iter().map(Vec::len).sum());
        for chunk in results {
            merged.extend(chunk);
        }
        merged
    }
}
