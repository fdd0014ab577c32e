//! Worker configuration
//!
//! Rule tables are compiled in; the only runtime knobs are the size of the
//! worker pool and its queue. The `compat-worker` binary fills these from its
//! command line and environment.

/// Default bound on queued requests
pub const DEFAULT_QUEUE_SIZE: usize = 256;

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Number of worker tasks
    pub worker_count: usize,
    /// Maximum queued requests before senders wait
    pub max_queue_size: usize,
}

impl WorkerConfig {
    pub fn new() -> Self {
        Self {
            worker_count: default_worker_count(),
            max_queue_size: DEFAULT_QUEUE_SIZE,
        }
    }

    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    pub fn with_max_queue_size(mut self, size: usize) -> Self {
        self.max_queue_size = size;
        self
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One worker per core, capped at four
fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}
