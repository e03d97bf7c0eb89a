//! Workout engine facade: wires the components and owns the finish pipeline.
//!
//! The engine is a single-writer surface: exactly one active session exists
//! and every mutation is sequential. Finishing a session runs, in order:
//! finalize -> append to the WAL and history -> recompute statistics ->
//! achievement check. Statistics are recomputed eagerly after every history
//! mutation; at bounded history sizes there is nothing to debounce.

use crate::{
    finalize, stats, wal, Achievement, AchievementBook, ActiveSession, CompletedExercise, Config,
    HistoryStore, JsonlSink, RecordSink, Result, SessionManager, SessionSignal, WorkoutRecord,
    WorkoutStats,
};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use uuid::Uuid;

/// Everything a finished session produced
#[derive(Clone, Debug)]
pub struct FinishOutcome {
    pub record: WorkoutRecord,
    pub newly_unlocked: Vec<Achievement>,
}

/// Facade over the session controller, history store, statistics aggregator
/// and achievement evaluator
pub struct WorkoutEngine {
    config: Config,
    sessions: SessionManager,
    history: HistoryStore,
    stats: WorkoutStats,
    achievements: AchievementBook,
    wal_path: PathBuf,
    state_path: PathBuf,
}

impl WorkoutEngine {
    /// Open the engine against the configured data directory.
    ///
    /// Loads persisted records (de-duplicated and re-sorted), the achievement
    /// book, and computes an initial statistics snapshot.
    pub fn open(config: Config) -> Result<Self> {
        let wal_dir = config.data.data_dir.join("wal");
        let wal_path = wal_dir.join("workout_records.wal");
        let state_path = wal_dir.join("achievements.json");

        let history = HistoryStore::from_records(wal::read_records(&wal_path)?);
        let achievements = AchievementBook::load(&state_path)?;
        tracing::info!("Opened engine with {} historical records", history.len());

        let mut engine = Self {
            config,
            sessions: SessionManager::new(),
            history,
            stats: WorkoutStats::default(),
            achievements,
            wal_path,
            state_path,
        };
        engine.refresh_stats();
        Ok(engine)
    }

    /// Mutable access to the session controller
    pub fn session_manager(&mut self) -> &mut SessionManager {
        &mut self.sessions
    }

    /// Snapshot of the in-progress session for rendering
    pub fn active_session(&self) -> Option<&ActiveSession> {
        self.sessions.active()
    }

    /// Subscribe to session signals (consumed by the rest-timer driver)
    pub fn subscribe_session_signals(&mut self) -> Receiver<SessionSignal> {
        self.sessions.subscribe()
    }

    /// Finalize the active session into a permanent record.
    ///
    /// No-op returning `None` when nothing is active. Otherwise the record is
    /// appended to the WAL and history, statistics recompute, achievements are
    /// checked (and persisted when anything unlocked), and the consumed
    /// session ceases to exist.
    pub fn finish_active(&mut self, elapsed_seconds: u32) -> Result<Option<FinishOutcome>> {
        let Some(session) = self.sessions.take_active() else {
            tracing::debug!("finish_active: no active session");
            return Ok(None);
        };

        let now = Utc::now();
        let record = finalize::finish(session, elapsed_seconds, now);

        JsonlSink::new(&self.wal_path).append(&record)?;
        self.history.append(record.clone());
        self.refresh_stats();

        let newly_unlocked =
            self.achievements
                .check(&self.stats, self.config.profile.weekly_goal, now);
        if !newly_unlocked.is_empty() {
            self.achievements.save(&self.state_path)?;
        }

        Ok(Some(FinishOutcome {
            record,
            newly_unlocked,
        }))
    }

    /// Discard the active session with no record created
    pub fn cancel_session(&mut self) -> bool {
        self.sessions.cancel()
    }

    /// Permanently delete a record, rewrite the WAL, and recompute stats
    pub fn delete_record(&mut self, id: Uuid) -> Result<bool> {
        if !self.history.delete(id) {
            return Ok(false);
        }
        wal::rewrite_records(&self.wal_path, self.history.records())?;
        self.refresh_stats();
        Ok(true)
    }

    /// Current derived statistics snapshot
    pub fn stats(&self) -> &WorkoutStats {
        &self.stats
    }

    /// Achievement list and accrued points
    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    /// All historical records, most recent first
    pub fn records(&self) -> &[WorkoutRecord] {
        self.history.records()
    }

    /// Inclusive date-range query for calendar/history views
    pub fn query_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&WorkoutRecord> {
        self.history.query_by_date_range(start, end)
    }

    /// Ghost-value lookup by exercise name
    pub fn previous_performance(&self, exercise_name: &str) -> Option<&CompletedExercise> {
        self.history.previous_performance(exercise_name)
    }

    /// Export history to CSV, returning the number of rows written
    pub fn export_csv(&self, path: &Path) -> Result<usize> {
        crate::csv_export::export_history(self.history.records(), path)
    }

    /// The profile's rest-timer default, for wiring up a timer
    pub fn default_rest_seconds(&self) -> u32 {
        self.config.profile.default_rest_seconds
    }

    fn refresh_stats(&mut self) {
        self.stats = stats::recompute(
            self.history.records(),
            Local::now(),
            self.config.profile.week_starts_on.weekday(),
        );
    }
}
