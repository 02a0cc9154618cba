use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use tempo_core::types::Schedule;
use tempo_store::{Result as StoreResult, ScheduleStore};

/// What to do with the `executed` flag when the effect call failed.
///
/// The default is [`MarkAlways`](CompletionPolicy::MarkAlways): best-effort,
/// mark-done-regardless. [`MarkOnSuccess`](CompletionPolicy::MarkOnSuccess)
/// leaves a failed schedule eligible so the next cycle retries it. This enum
/// is the single decision point for that behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionPolicy {
    MarkAlways,
    MarkOnSuccess,
}

impl CompletionPolicy {
    /// Map the `engine.mark_executed_on_failure` config flag.
    pub fn from_mark_on_failure(mark_on_failure: bool) -> Self {
        if mark_on_failure {
            CompletionPolicy::MarkAlways
        } else {
            CompletionPolicy::MarkOnSuccess
        }
    }
}

/// Persists the outcome of one execution attempt.
pub struct CompletionRecorder {
    store: Arc<dyn ScheduleStore>,
    policy: CompletionPolicy,
}

impl CompletionRecorder {
    pub fn new(store: Arc<dyn ScheduleStore>, policy: CompletionPolicy) -> Self {
        Self { store, policy }
    }

    /// Mark `schedule` executed and refresh `update_date`, then save.
    ///
    /// No-op for a schedule that is already marked executed. Under
    /// `MarkOnSuccess`, a failed attempt is also a no-op — the schedule stays
    /// eligible. A save error propagates to the caller for logging; the
    /// record is unchanged in the store, so the next cycle picks it up again
    /// (at-least-once semantics).
    pub fn record(&self, schedule: &Schedule, effect_succeeded: bool) -> StoreResult<()> {
        if schedule.executed {
            debug!(schedule_id = %schedule.id, "already marked executed, skipping");
            return Ok(());
        }
        if !effect_succeeded && self.policy == CompletionPolicy::MarkOnSuccess {
            debug!(schedule_id = %schedule.id, "effect failed, leaving schedule eligible");
            return Ok(());
        }

        let mut done = schedule.clone();
        done.executed = true;
        done.update_date = Utc::now();
        self.store.save(&done)?;
        debug!(schedule_id = %schedule.id, "schedule marked executed");
        Ok(())
    }
}
