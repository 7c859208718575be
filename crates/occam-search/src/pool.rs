use rayon::ThreadPool as RayonPool;

/// C8 — a work-stealing pool of `P = min(cpu_count, candidates_per_level)`
/// workers. Backed by a dedicated `rayon` thread pool rather than the
/// global one, so the enclosing collaborator owns its lifecycle explicitly
/// through `new(n_threads)`/`shutdown()` rather than a hidden thread-local
/// singleton.
///
/// Each dispatched model becomes one independent task with no inter-task
/// communication; `evaluate` joins all of them before returning, matching
/// the level barrier in the search driver's beam search.
pub struct WorkPool {
    inner: Option<RayonPool>,
    num_workers: usize,
}

/// Below this many candidates per level, the batching heuristic
/// runs evaluation on the calling thread instead of dispatching tasks: a
/// single BP/IPF evaluation is 0.1-3ms, and thread hand-off cost dominates
/// for small batches.
const SEQUENTIAL_BATCH_FACTOR: usize = 8;

impl WorkPool {
    /// Builds a pool with `num_threads` workers. `num_threads == 0` is
    /// treated as "use all available hardware concurrency", matching
    /// `rayon::ThreadPoolBuilder`'s own convention.
    pub fn new(num_threads: usize) -> Self {
        let builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("occam-search-{i}"));
        let builder = if num_threads > 0 { builder.num_threads(num_threads) } else { builder };
        let pool = builder.build().expect("failed to spawn occam-search work pool");
        let num_workers = pool.current_num_threads();
        Self { inner: Some(pool), num_workers }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Runs `f` over every item in `items` and collects the results.
    ///
    /// Honors the batching threshold: fewer than `P * 8` items run
    /// sequentially on the calling thread; at or above it, each item is
    /// dispatched as its own task inside the pool and joined before
    /// returning, matching the search driver's level barrier.
    pub fn evaluate<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        if items.len() < self.num_workers * SEQUENTIAL_BATCH_FACTOR {
            return items.into_iter().map(f).collect();
        }

        let pool = self.inner.as_ref().expect("evaluate called after shutdown");
        pool.install(|| {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            items.into_par_iter().map(f).collect()
        })
    }

    /// Explicit shutdown. Dropping the inner pool blocks until every
    /// worker thread has joined.
    pub fn shutdown(&mut self) {
        self.inner.take();
    }
}

impl Default for WorkPool {
    fn default() -> Self {
        Self::new(0)
    }
}
