//! Completion finalizer: converts the active session into an immutable record.
//!
//! Every set entry, completed or not, survives into the record so skipped
//! work stays visible in history. Raw weight/reps text is parsed here with a
//! zero fallback; nothing ever throws for bad input.

use crate::{ActiveSession, CompletedExercise, CompletedSet, WorkoutRecord};
use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

/// Parse raw weight text; invalid or empty input yields 0.0
pub(crate) fn parse_weight(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Parse raw reps text; invalid, empty, or negative input yields 0
pub(crate) fn parse_reps(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}

/// Finalize a session into a [`WorkoutRecord`].
///
/// `now` is the finish instant: it stamps both `created_at` and the display
/// `date_label` (finish time, not session start). The caller supplies the
/// elapsed duration and is responsible for discarding the consumed session.
pub fn finish(session: ActiveSession, elapsed_seconds: u32, now: DateTime<Utc>) -> WorkoutRecord {
    let exercises: Vec<CompletedExercise> = session
        .exercises
        .iter()
        .map(|exercise| {
            let sets: Vec<CompletedSet> = exercise
                .sets
                .iter()
                .enumerate()
                .map(|(position, set)| CompletedSet {
                    set_number: position as u32 + 1,
                    weight: parse_weight(&set.weight),
                    reps: parse_reps(&set.reps),
                    is_completed: set.completed,
                })
                .collect();

            let total_volume = sets.iter().map(|s| s.weight * f64::from(s.reps)).sum();

            CompletedExercise {
                exercise_id: exercise.id.clone(),
                exercise_name: exercise.name.clone(),
                muscle_group: exercise.muscle_group,
                total_volume,
                sets,
            }
        })
        .collect();

    let total_volume = exercises.iter().map(|e| e.total_volume).sum();
    let total_sets = exercises.iter().map(|e| e.sets.len() as u32).sum();
    let total_reps = exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .map(|s| s.reps)
        .sum();

    let record = WorkoutRecord {
        id: Uuid::new_v4(),
        date_label: now.with_timezone(&Local).format("%b %-d, %Y").to_string(),
        template_id: session.template_id.clone(),
        template_name: session.template_id.as_ref().map(|_| session.name.clone()),
        duration_seconds: elapsed_seconds,
        total_volume,
        total_sets,
        total_reps,
        created_at: now,
        exercises,
    };

    tracing::info!(
        "Finalized session {} into record {}: {} sets, volume {}",
        session.id,
        record.id,
        record.total_sets,
        record.total_volume
    );
    record
}
