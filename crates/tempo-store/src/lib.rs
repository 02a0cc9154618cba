//! `tempo-store` — durable record keeper for schedules, backed by SQLite.
//!
//! The [`ScheduleStore`] trait is the collaborator interface the execution
//! engine and the management API share: `save` / `find_by_id` / `find_all` /
//! `delete` plus the due-set query `find_due`. [`SqliteScheduleStore`] is the
//! production implementation; tests substitute in-memory doubles.

pub mod db;
pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{ScheduleStore, SqliteScheduleStore};
