//! End-to-end cycle behaviour of the execution engine against test doubles
//! and a real in-memory SQLite store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use tempo_core::config::EngineConfig;
use tempo_core::types::{Schedule, ScheduleInfo};
use tempo_engine::{EngineError, ExecutionHandler, Poller};
use tempo_store::{Result as StoreResult, ScheduleStore, SqliteScheduleStore, StoreError};

/// In-memory store with injectable discovery and save failures.
struct MemoryStore {
    rows: Mutex<Vec<Schedule>>,
    fail_find_due: AtomicBool,
    fail_saves: AtomicBool,
}

impl MemoryStore {
    fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail_find_due: AtomicBool::new(false),
            fail_saves: AtomicBool::new(false),
        }
    }

    fn insert(&self, schedule: Schedule) {
        self.rows.lock().unwrap().push(schedule);
    }
}

impl ScheduleStore for MemoryStore {
    fn save(&self, schedule: &Schedule) -> StoreResult<Schedule> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        let mut rows = self.rows.lock().unwrap();
        if let Some(slot) = rows.iter_mut().find(|s| s.id == schedule.id) {
            *slot = schedule.clone();
        } else {
            rows.push(schedule.clone());
        }
        Ok(schedule.clone())
    }

    fn find_by_id(&self, id: &str) -> StoreResult<Option<Schedule>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    fn find_all(&self) -> StoreResult<Vec<Schedule>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    fn delete(&self, id: &str) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        if rows.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    fn find_due(&self, now: DateTime<Utc>) -> StoreResult<Vec<Schedule>> {
        if self.fail_find_due.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected discovery failure".into()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.is_due(now))
            .cloned()
            .collect())
    }
}

/// Handler that records every call and fails for a chosen set of ids.
struct RecordingHandler {
    calls: Mutex<Vec<String>>,
    fail_ids: Vec<String>,
}

impl RecordingHandler {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_ids: Vec::new(),
        }
    }

    fn failing_for(ids: Vec<String>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_ids: ids,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionHandler for RecordingHandler {
    async fn execute(&self, schedule: &Schedule) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(schedule.id.clone());
        if self.fail_ids.contains(&schedule.id) {
            return Err(EngineError::EffectRejected("injected handler failure".into()));
        }
        Ok(())
    }
}

fn engine_config() -> EngineConfig {
    EngineConfig {
        poll_interval_secs: 1,
        worker_count: 5,
        mark_executed_on_failure: true,
    }
}

fn schedule_at(name: &str, start: DateTime<Utc>) -> Schedule {
    Schedule::new(name, start, ScheduleInfo::default())
}

async fn run_cycle(poller: &Poller) {
    for handle in poller.cycle() {
        handle.await.expect("execution unit completed");
    }
}

#[tokio::test]
async fn one_cycle_submits_exactly_the_due_set() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();

    let due_a = schedule_at("a", now - Duration::seconds(1));
    let due_b = schedule_at("b", now - Duration::minutes(10));
    let future = schedule_at("future", now + Duration::hours(1));
    let mut done = schedule_at("done", now - Duration::minutes(1));
    done.executed = true;

    for s in [&due_a, &due_b, &future, &done] {
        store.insert(s.clone());
    }

    let handler = Arc::new(RecordingHandler::new());
    let poller = Poller::new(&engine_config(), store.clone(), handler.clone());
    run_cycle(&poller).await;

    let mut calls = handler.calls();
    calls.sort();
    let mut expected = vec![due_a.id.clone(), due_b.id.clone()];
    expected.sort();
    assert_eq!(calls, expected);

    // A second cycle finds nothing: both executed flags are now set.
    run_cycle(&poller).await;
    assert_eq!(handler.calls().len(), 2);
}

#[tokio::test]
async fn empty_due_set_is_a_noop() {
    let store = Arc::new(MemoryStore::new());
    store.insert(schedule_at("later", Utc::now() + Duration::hours(2)));

    let handler = Arc::new(RecordingHandler::new());
    let poller = Poller::new(&engine_config(), store, handler.clone());

    let handles = poller.cycle();
    assert!(handles.is_empty());
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn discovery_failure_aborts_only_that_cycle() {
    let store = Arc::new(MemoryStore::new());
    store.insert(schedule_at("due", Utc::now() - Duration::seconds(5)));
    store.fail_find_due.store(true, Ordering::SeqCst);

    let handler = Arc::new(RecordingHandler::new());
    let poller = Poller::new(&engine_config(), store.clone(), handler.clone());

    assert!(poller.cycle().is_empty());
    assert!(handler.calls().is_empty());

    // Next tick is an independent retry.
    store.fail_find_due.store(false, Ordering::SeqCst);
    run_cycle(&poller).await;
    assert_eq!(handler.calls().len(), 1);
}

#[tokio::test]
async fn one_failing_unit_does_not_block_siblings() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let bad = schedule_at("bad", now - Duration::seconds(1));
    let good = schedule_at("good", now - Duration::seconds(2));
    store.insert(bad.clone());
    store.insert(good.clone());

    let handler = Arc::new(RecordingHandler::failing_for(vec![bad.id.clone()]));
    let poller = Poller::new(&engine_config(), store.clone(), handler.clone());
    run_cycle(&poller).await;

    assert_eq!(handler.calls().len(), 2);
    // Default policy: both are marked executed, failure or not.
    assert!(store.find_by_id(&bad.id).unwrap().unwrap().executed);
    assert!(store.find_by_id(&good.id).unwrap().unwrap().executed);
}

#[tokio::test]
async fn failed_save_keeps_schedule_eligible_for_retry() {
    let store = Arc::new(MemoryStore::new());
    let s = schedule_at("retry-me", Utc::now() - Duration::seconds(1));
    store.insert(s.clone());
    store.fail_saves.store(true, Ordering::SeqCst);

    let handler = Arc::new(RecordingHandler::new());
    let poller = Poller::new(&engine_config(), store.clone(), handler.clone());

    run_cycle(&poller).await;
    assert_eq!(handler.calls().len(), 1);
    assert!(!store.find_by_id(&s.id).unwrap().unwrap().executed);

    // Save works again: the next cycle re-runs the effect (at-least-once,
    // duplicate call expected) and completes the record.
    store.fail_saves.store(false, Ordering::SeqCst);
    run_cycle(&poller).await;
    assert_eq!(handler.calls().len(), 2);
    assert!(store.find_by_id(&s.id).unwrap().unwrap().executed);
}

#[tokio::test]
async fn surge_of_due_schedules_all_complete_under_small_pool() {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    for i in 0..20 {
        store.insert(schedule_at(&format!("s{i}"), now - Duration::seconds(i)));
    }

    let handler = Arc::new(RecordingHandler::new());
    let config = EngineConfig {
        worker_count: 3,
        ..engine_config()
    };
    let poller = Poller::new(&config, store.clone(), handler.clone());
    run_cycle(&poller).await;

    assert_eq!(handler.calls().len(), 20);
    assert!(store.find_all().unwrap().iter().all(|s| s.executed));
}

#[tokio::test]
async fn cycle_against_sqlite_store_flips_executed_and_update_date() {
    let conn = rusqlite::Connection::open_in_memory().expect("in-memory db");
    let store = Arc::new(SqliteScheduleStore::new(conn).expect("schema"));

    let now = Utc::now();
    let due = schedule_at("due-a", now - Duration::seconds(1));
    let future = schedule_at("future-b", now + Duration::hours(1));
    store.save(&due).expect("save");
    store.save(&future).expect("save");

    let handler = Arc::new(RecordingHandler::new());
    let poller = Poller::new(&engine_config(), store.clone(), handler.clone());
    run_cycle(&poller).await;

    assert_eq!(handler.calls(), vec![due.id.clone()]);

    let executed = store.find_by_id(&due.id).unwrap().unwrap();
    assert!(executed.executed);
    assert!(executed.update_date > due.update_date);

    let untouched = store.find_by_id(&future.id).unwrap().unwrap();
    assert!(!untouched.executed);
    assert_eq!(untouched.update_date, future.update_date);
}
