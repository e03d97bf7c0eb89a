#![forbid(unsafe_code)]

//! Core domain model and business logic for the LiftLog workout engine.
//!
//! This crate provides:
//! - Domain types (templates, sessions, sets, records, statistics)
//! - The session controller and its completion signals
//! - The rest-timer automaton
//! - Finalization of sessions into immutable records
//! - History, statistics aggregation and achievement evaluation
//! - Persistence (WAL, achievement state, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod wal;
pub mod csv_export;
pub mod state;
pub mod session;
pub mod timer;
pub mod finalize;
pub mod history;
pub mod stats;
pub mod achievements;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::{Config, WeekStart};
pub use wal::{JsonlSink, RecordSink};
pub use session::{SessionManager, SessionSignal, SetAction, SetField};
pub use timer::{RestTimer, TimerEvent, TimerState, ADJUST_STEP_SECONDS};
pub use finalize::finish;
pub use history::HistoryStore;
pub use stats::recompute;
pub use achievements::{Achievement, AchievementBook, UnlockRule, POINTS_PER_UNLOCK};
pub use engine::{FinishOutcome, WorkoutEngine};
