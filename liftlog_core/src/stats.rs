//! Statistics aggregator: a pure fold over the history store.
//!
//! Recomputation is a full O(n) pass, intentionally not incrementally
//! maintained - n is bounded by one user's lifetime workout count, so the
//! fold runs eagerly after every history mutation.
//!
//! The fold visits records oldest-first (ascending `created_at`, record id as
//! the final tie-break), which pins down the outcomes that were
//! order-dependent in earlier incarnations of this logic: favorite-exercise
//! ties go to the name that reached the top count first, and a personal
//! record is only replaced by a strictly greater weight, so the earliest
//! occurrence of the maximum wins.

use crate::{PersonalRecord, WorkoutRecord, WorkoutStats};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::collections::{HashMap, HashSet};

/// Local midnight on the first day of the current week
fn start_of_week(today: NaiveDate, week_starts_on: Weekday) -> NaiveDateTime {
    let days_back = (today.weekday().num_days_from_monday() + 7
        - week_starts_on.num_days_from_monday())
        % 7;
    (today - Duration::days(i64::from(days_back))).and_time(NaiveTime::MIN)
}

/// Local midnight on the first day of the current month
fn start_of_month(today: NaiveDate) -> NaiveDateTime {
    today.with_day(1).unwrap_or(today).and_time(NaiveTime::MIN)
}

/// Consecutive calendar days (local) with at least one workout, ending today
/// or yesterday.
///
/// Anchoring at yesterday keeps a streak alive until the current day is over;
/// any older gap breaks the chain and the count degrades to zero.
fn streak_days(records: &[WorkoutRecord], today: NaiveDate) -> u32 {
    let workout_days: HashSet<NaiveDate> = records
        .iter()
        .map(|r| r.created_at.with_timezone(&Local).date_naive())
        .collect();

    let mut day = if workout_days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) => yesterday,
            None => return 0,
        }
    };

    let mut streak = 0;
    while workout_days.contains(&day) {
        streak += 1;
        day = match day.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }
    streak
}

/// Recompute derived statistics from the full history.
///
/// `now` is the observer's local clock; week and month windows start at local
/// midnight and their boundaries are inclusive.
pub fn recompute(
    records: &[WorkoutRecord],
    now: DateTime<Local>,
    week_starts_on: Weekday,
) -> WorkoutStats {
    if records.is_empty() {
        return WorkoutStats::default();
    }

    // Deterministic fold order: oldest first, id as final tie-break
    let mut chronological: Vec<&WorkoutRecord> = records.iter().collect();
    chronological.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let today = now.date_naive();
    let week_start = start_of_week(today, week_starts_on);
    let month_start = start_of_month(today);

    let total_workouts = chronological.len() as u32;
    let mut this_week_workouts = 0;
    let mut this_month_workouts = 0;
    let mut total_volume = 0.0;
    let mut total_duration: u64 = 0;

    let mut occurrence_counts: HashMap<&str, u32> = HashMap::new();
    let mut favorite: Option<(&str, u32)> = None;
    let mut personal_records: HashMap<String, PersonalRecord> = HashMap::new();

    for record in &chronological {
        let local_time = record.created_at.with_timezone(&Local).naive_local();
        if local_time >= week_start {
            this_week_workouts += 1;
        }
        if local_time >= month_start {
            this_month_workouts += 1;
        }

        total_volume += record.total_volume;
        total_duration += u64::from(record.duration_seconds);

        for exercise in &record.exercises {
            let count = occurrence_counts
                .entry(exercise.exercise_name.as_str())
                .or_insert(0);
            *count += 1;
            // Strictly-greater comparison: the first name to reach the top
            // count stays the favorite
            if favorite.map_or(true, |(_, best)| *count > best) {
                favorite = Some((exercise.exercise_name.as_str(), *count));
            }

            for set in &exercise.sets {
                let is_new_record = personal_records
                    .get(&exercise.exercise_id)
                    .map_or(true, |pr| set.weight > pr.weight);
                if is_new_record {
                    personal_records.insert(
                        exercise.exercise_id.clone(),
                        PersonalRecord {
                            weight: set.weight,
                            reps: set.reps,
                            date: record.created_at,
                        },
                    );
                }
            }
        }
    }

    let average_duration_seconds =
        (total_duration as f64 / f64::from(total_workouts)).round() as u32;

    WorkoutStats {
        total_workouts,
        this_week_workouts,
        this_month_workouts,
        total_volume,
        average_duration_seconds,
        current_streak_days: streak_days(records, today),
        favorite_exercise: favorite.map(|(name, _)| name.to_string()),
        personal_records,
    }
}
