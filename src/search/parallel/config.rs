//! Configuration for parallel frontier checking.

/// Configuration for parallel frontier checking.
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of worker threads to spawn.
    pub num_workers: usize,
    /// Frontiers smaller than this are split into fewer chunks.
    pub min_chunk_size: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            min_chunk_size: 1024,
        }
    }
}

impl ParallelConfig {
    /// Set the number of workers; zero means one per CPU.
    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = if num_workers == 0 {
            num_cpus::get()
        } else {
            num_workers
        };
        self
    }

    pub fn with_min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size.max(1);
        self
    }

    /// Split `0..len` into contiguous chunks, one per worker at most.
    pub fn chunks(&self, len: usize) -> Vec<std::ops::Range<usize>> {
        if len == 0 {
            return Vec::new();
        }
        let by_size = len.div_ceil(self.min_chunk_size.max(1));
        let count = self.num_workers.max(1).min(by_size);
        let chunk = len.div_ceil(count);
        (0..count)
            .map(|i| (i * chunk)..((i + 1) * chunk).min(len))
            .filter(|range| !range.is_empty())
            .collect()
    }
}
