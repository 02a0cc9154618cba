//! `tempo-engine` — the schedule execution engine.
//!
//! # Overview
//!
//! A [`poller::Poller`] wakes on a fixed interval, asks the store for the
//! due set (`executed = false`, `start_date_time <= now`) and submits one
//! execution unit per schedule to a bounded [`pool::WorkerPool`]. Each unit
//! runs the [`handler::ExecutionHandler`] effect call, then the
//! [`recorder::CompletionRecorder`] flips `executed` and saves the record.
//!
//! # Failure model
//!
//! No failure is fatal: a broken discovery query aborts one cycle, a failed
//! effect call is logged per [`recorder::CompletionPolicy`], and a failed
//! save leaves the schedule eligible so the next cycle retries it. The net
//! guarantee is at-least-once execution of every due schedule.

pub mod error;
pub mod handler;
pub mod poller;
pub mod pool;
pub mod recorder;

pub use error::{EngineError, Result};
pub use handler::{ExecutionHandler, HttpEffectHandler};
pub use poller::Poller;
pub use pool::WorkerPool;
pub use recorder::{CompletionPolicy, CompletionRecorder};
