use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use tempo_core::config::EngineConfig;
use tempo_store::ScheduleStore;

use crate::handler::ExecutionHandler;
use crate::pool::WorkerPool;
use crate::recorder::{CompletionPolicy, CompletionRecorder};

/// The discovery-and-dispatch control loop.
///
/// One instance per process. Each tick runs a single discovery pass against
/// the store and fire-and-forgets one execution unit per due schedule into
/// the worker pool; the tick never waits for units to finish. Discovery runs
/// inline in the loop, so a tick that arrives while the previous pass is
/// still querying is skipped (`MissedTickBehavior::Skip`) — at most one
/// discovery call is ever in flight.
pub struct Poller {
    store: Arc<dyn ScheduleStore>,
    handler: Arc<dyn ExecutionHandler>,
    recorder: Arc<CompletionRecorder>,
    pool: WorkerPool,
    poll_interval: Duration,
}

impl Poller {
    /// Wire up a poller from config. The worker pool and recorder are owned
    /// here and live for the life of the process.
    pub fn new(
        config: &EngineConfig,
        store: Arc<dyn ScheduleStore>,
        handler: Arc<dyn ExecutionHandler>,
    ) -> Self {
        let policy = CompletionPolicy::from_mark_on_failure(config.mark_executed_on_failure);
        Self {
            recorder: Arc::new(CompletionRecorder::new(Arc::clone(&store), policy)),
            pool: WorkerPool::new(config.worker_count),
            store,
            handler,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
        }
    }

    /// Main loop. Ticks at the configured interval until `shutdown`
    /// broadcasts `true`. In-flight execution units are not awaited on
    /// shutdown; they run to completion on the runtime.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            workers = self.pool.available_workers(),
            "execution engine started"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.cycle();
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("execution engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One discovery pass: a single `now` for every comparison in the cycle,
    /// one submission per due schedule.
    ///
    /// Store failure aborts only this cycle; the next tick is an independent
    /// retry. Returns the join handles of the submitted units so callers
    /// that want completion visibility (tests, a monitor task) can await
    /// them — the run loop drops them.
    pub fn cycle(&self) -> Vec<JoinHandle<()>> {
        let now = Utc::now();

        let due = match self.store.find_due(now) {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "due-set query failed, skipping cycle");
                return Vec::new();
            }
        };

        if due.is_empty() {
            debug!(%now, "no due schedules");
            return Vec::new();
        }

        info!(count = due.len(), %now, "dispatching due schedules");

        due.into_iter()
            .map(|schedule| {
                let handler = Arc::clone(&self.handler);
                let recorder = Arc::clone(&self.recorder);
                self.pool.submit(async move {
                    let outcome = handler.execute(&schedule).await;
                    if let Err(ref e) = outcome {
                        warn!(schedule_id = %schedule.id, error = %e, "effect call failed");
                    }
                    if let Err(e) = recorder.record(&schedule, outcome.is_ok()) {
                        error!(schedule_id = %schedule.id, error = %e, "completion save failed, schedule stays eligible");
                    }
                })
            })
            .collect()
    }
}
