/// How a single operation spreads its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    /// Run on the calling thread without locking.
    #[default]
    Sequential,
    /// Fan out over the index's worker pool and join before returning.
    Parallel,
}

/// Tuning knobs for a [`SearchIndex`](crate::SearchIndex).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexConfig {
    /// Worker count for the parallel path, also used as the accumulator's
    /// bucket count. `None` uses rayon's global pool.
    pub parallelism: Option<usize>,
    /// Maximum number of cached query parses. `None` keeps every parse;
    /// once the limit is hit new parses are computed but not stored.
    pub query_cache_capacity: Option<usize>,
}

impl IndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads.max(1));
        self
    }

    pub fn query_cache_capacity(mut self, capacity: usize) -> Self {
        self.query_cache_capacity = Some(capacity);
        self
    }
}
