//! `tempo-core` — shared types, configuration and errors for the tempo
//! schedule execution service.
//!
//! Every other crate in the workspace depends on this one: the
//! [`types::Schedule`] record is what the store persists, the engine
//! executes and the gateway serves; [`config::TempoConfig`] is loaded once
//! in the gateway binary and handed down by value.

pub mod config;
pub mod error;
pub mod types;

pub use error::{Result, TempoError};
pub use types::{Category, Priority, RecurrencePattern, Schedule, ScheduleInfo};
