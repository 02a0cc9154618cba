use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Bounded-parallelism executor for schedule execution units.
///
/// At most `workers` units run at once; further submissions wait on the
/// semaphore in an unbounded queue of parked tasks. Created once at startup
/// and shared by handle — cloning is cheap.
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Submit a unit of work, fire-and-forget.
    ///
    /// The unit starts only once a worker permit is free. A panic inside the
    /// unit is contained by the task boundary and cannot take down sibling
    /// units or the pool. The returned handle may be awaited by callers that
    /// want completion visibility; the poller drops it.
    pub fn submit<F>(&self, unit: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            // The semaphore is never closed, so this only fails if the pool
            // itself is gone — in which case there is nothing left to run.
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            unit.await;
        })
    }

    /// Number of currently idle workers.
    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }
}
