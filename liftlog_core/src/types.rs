//! Core domain types for the LiftLog workout engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise and workout templates
//! - The single mutable active session and its sets
//! - Immutable workout records with computed aggregates
//! - Derived statistics and personal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Template Types
// ============================================================================

/// Muscle group targeted by an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    FullBody,
}

/// A single exercise template (e.g., "Bench Press"), owned by the catalog
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseTemplate {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    pub default_sets: u32,
}

/// A workout template: an ordered list of exercise template ids
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    pub exercises: Vec<String>,
}

// ============================================================================
// Active Session Types
// ============================================================================

/// One attempt (weight x reps) within an exercise.
///
/// Weight and reps hold raw text while the session is in progress; nothing is
/// validated until the session is finalized. Invalid or empty text parses to
/// zero at that point.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SetEntry {
    pub id: Uuid,
    pub weight: String,
    pub reps: String,
    pub completed: bool,
}

impl SetEntry {
    /// A fresh pending set with empty weight/reps
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            weight: String::new(),
            reps: String::new(),
            completed: false,
        }
    }
}

impl Default for SetEntry {
    fn default() -> Self {
        Self::new()
    }
}

/// An exercise within the active session.
///
/// The `id` is the stable catalog id when the exercise was seeded from a
/// template (personal records aggregate on it across sessions), or a generated
/// id for custom exercises. Displayed set numbers derive from list position,
/// never from a stored field.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseInSession {
    pub id: String,
    pub name: String,
    pub muscle_group: MuscleGroup,
    /// Display-only flag for collapsible rendering
    pub expanded: bool,
    pub sets: Vec<SetEntry>,
}

/// The single in-progress, mutable workout session.
///
/// At most one instance exists at a time; starting a new session replaces any
/// existing one. The session is either discarded (cancel) or consumed by the
/// finalizer (finish) and ceases to exist afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActiveSession {
    pub id: Uuid,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub template_id: Option<String>,
    pub exercises: Vec<ExerciseInSession>,
}

// ============================================================================
// Record Types (immutable after finalization)
// ============================================================================

/// One finalized set in a workout record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedSet {
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub is_completed: bool,
}

/// One finalized exercise with its volume aggregate
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompletedExercise {
    pub exercise_id: String,
    pub exercise_name: String,
    pub muscle_group: MuscleGroup,
    pub total_volume: f64,
    pub sets: Vec<CompletedSet>,
}

/// Immutable historical record of a finished session.
///
/// Uncompleted sets are retained on purpose so skipped work stays visible in
/// history. Records are deletable but never otherwise mutated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub date_label: String,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
    pub duration_seconds: u32,
    pub total_volume: f64,
    pub total_sets: u32,
    pub total_reps: u32,
    pub created_at: DateTime<Utc>,
    pub exercises: Vec<CompletedExercise>,
}

// ============================================================================
// Derived Statistics
// ============================================================================

/// Highest weight ever logged for a given exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PersonalRecord {
    pub weight: f64,
    pub reps: u32,
    pub date: DateTime<Utc>,
}

/// Statistics derived from the history store.
///
/// This has no independent lifecycle: it is always a pure function of the
/// current history contents, recomputed after every history mutation.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct WorkoutStats {
    pub total_workouts: u32,
    pub this_week_workouts: u32,
    pub this_month_workouts: u32,
    pub total_volume: f64,
    pub average_duration_seconds: u32,
    /// Consecutive calendar days (local) with at least one workout, ending
    /// today or yesterday
    pub current_streak_days: u32,
    pub favorite_exercise: Option<String>,
    /// Keyed by exercise id
    pub personal_records: HashMap<String, PersonalRecord>,
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of exercise and workout templates
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, ExerciseTemplate>,
    pub workouts: HashMap<String, WorkoutTemplate>,
}
