//! History store: the ordered log of finalized workout records.
//!
//! Records are kept most-recent-first. Appends are head-inserts, so the order
//! invariant holds by construction; the loader path re-sorts and de-duplicates
//! because external data may arrive out of chronological order.

use crate::WorkoutRecord;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// Append-only (with delete) store of finalized records, newest first
#[derive(Debug, Default)]
pub struct HistoryStore {
    records: Vec<WorkoutRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded records.
    ///
    /// De-duplicates by record id (first occurrence wins) and re-sorts newest
    /// first, so unsorted or duplicated external data cannot break the
    /// most-recent-first invariant downstream code relies on.
    pub fn from_records(records: Vec<WorkoutRecord>) -> Self {
        let mut seen_ids = HashSet::new();
        let mut records: Vec<WorkoutRecord> = records
            .into_iter()
            .filter(|r| seen_ids.insert(r.id))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { records }
    }

    /// Head-insert a freshly finalized record
    pub fn append(&mut self, record: WorkoutRecord) {
        tracing::debug!("Appending record {} to history", record.id);
        self.records.insert(0, record);
    }

    /// Permanently remove a record. Returns false for unknown ids.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        before != self.records.len()
    }

    /// All records, most recent first
    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose effective timestamp falls inside the range, inclusive on
    /// both ends. Used for calendar/day views and week bucketing.
    pub fn query_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&WorkoutRecord> {
        self.records
            .iter()
            .filter(|r| r.created_at >= start && r.created_at <= end)
            .collect()
    }

    /// Ghost-value lookup: the most recent completed exercise whose NAME
    /// matches.
    ///
    /// Matching is by name string, not id, so a renamed exercise loses
    /// continuity with its prior data. That is existing behavior, documented
    /// rather than fixed.
    pub fn previous_performance(&self, exercise_name: &str) -> Option<&crate::CompletedExercise> {
        self.records
            .iter()
            .flat_map(|r| r.exercises.iter())
            .find(|e| e.exercise_name == exercise_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompletedExercise, CompletedSet, MuscleGroup};
    use chrono::Duration;

    fn record_at(days_ago: i64, volume: f64) -> WorkoutRecord {
        let created_at = Utc::now() - Duration::days(days_ago);
        WorkoutRecord {
            id: Uuid::new_v4(),
            date_label: created_at.format("%b %-d, %Y").to_string(),
            template_id: None,
            template_name: None,
            duration_seconds: 600,
            total_volume: volume,
            total_sets: 1,
            total_reps: 5,
            created_at,
            exercises: vec![],
        }
    }

    fn bench_exercise(weight: f64, reps: u32) -> CompletedExercise {
        CompletedExercise {
            exercise_id: "bench_press".into(),
            exercise_name: "Bench Press".into(),
            muscle_group: MuscleGroup::Chest,
            total_volume: weight * f64::from(reps),
            sets: vec![CompletedSet {
                set_number: 1,
                weight,
                reps,
                is_completed: true,
            }],
        }
    }

    #[test]
    fn test_append_is_head_insert() {
        let mut store = HistoryStore::new();
        let first = record_at(2, 100.0);
        let second = record_at(1, 200.0);
        let first_id = first.id;
        let second_id = second.id;

        store.append(first);
        store.append(second);

        assert_eq!(store.records()[0].id, second_id);
        assert_eq!(store.records()[1].id, first_id);
    }

    #[test]
    fn test_from_records_resorts_newest_first() {
        let old = record_at(5, 100.0);
        let new = record_at(1, 200.0);
        let mid = record_at(3, 300.0);

        // Deliberately out of chronological order
        let store = HistoryStore::from_records(vec![old.clone(), new.clone(), mid.clone()]);

        let ids: Vec<Uuid> = store.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![new.id, mid.id, old.id]);
    }

    #[test]
    fn test_from_records_deduplicates_by_id() {
        let record = record_at(1, 100.0);
        let store = HistoryStore::from_records(vec![record.clone(), record.clone()]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_removes_permanently() {
        let record = record_at(1, 100.0);
        let id = record.id;
        let mut store = HistoryStore::from_records(vec![record]);

        assert!(store.delete(id));
        assert!(store.is_empty());
        assert!(!store.delete(id));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let record = record_at(0, 100.0);
        let at = record.created_at;
        let store = HistoryStore::from_records(vec![record]);

        // Exact boundaries on both ends
        assert_eq!(store.query_by_date_range(at, at).len(), 1);
        assert_eq!(
            store
                .query_by_date_range(at + Duration::milliseconds(1), at + Duration::days(1))
                .len(),
            0
        );
        assert_eq!(
            store
                .query_by_date_range(at - Duration::days(1), at - Duration::milliseconds(1))
                .len(),
            0
        );
    }

    #[test]
    fn test_previous_performance_matches_most_recent_by_name() {
        let mut older = record_at(3, 500.0);
        older.exercises = vec![bench_exercise(95.0, 5)];
        let mut newer = record_at(1, 550.0);
        newer.exercises = vec![bench_exercise(100.0, 5)];

        let store = HistoryStore::from_records(vec![older, newer]);

        let ghost = store.previous_performance("Bench Press").unwrap();
        assert_eq!(ghost.sets[0].weight, 100.0);
    }

    #[test]
    fn test_previous_performance_is_name_sensitive() {
        let mut record = record_at(1, 500.0);
        record.exercises = vec![bench_exercise(100.0, 5)];
        let store = HistoryStore::from_records(vec![record]);

        // A renamed exercise loses its ghost data
        assert!(store.previous_performance("Flat Bench Press").is_none());
        assert!(store.previous_performance("Bench Press").is_some());
    }
}
