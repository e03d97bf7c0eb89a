//! CSV export of workout history.
//!
//! Produces one row per record with the computed aggregates, suitable for
//! spreadsheets or downstream analysis. The export is a full snapshot; it
//! overwrites any previous export at the same path.

use crate::{Result, WorkoutRecord};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    date: String,
    template: Option<String>,
    duration_seconds: u32,
    total_volume: f64,
    total_sets: u32,
    total_reps: u32,
    exercises: usize,
}

impl From<&WorkoutRecord> for CsvRow {
    fn from(record: &WorkoutRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            date: record.created_at.to_rfc3339(),
            template: record.template_name.clone(),
            duration_seconds: record.duration_seconds,
            total_volume: record.total_volume,
            total_sets: record.total_sets,
            total_reps: record.total_reps,
            exercises: record.exercises.len(),
        }
    }
}

/// Write all records to a CSV file, returning the number of rows written
pub fn export_history(records: &[WorkoutRecord], csv_path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(csv_path)?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} records to {:?}", records.len(), csv_path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_record(volume: f64) -> WorkoutRecord {
        WorkoutRecord {
            id: Uuid::new_v4(),
            date_label: "Mar 9, 2024".into(),
            template_id: Some("push_day".into()),
            template_name: Some("Push Day".into()),
            duration_seconds: 600,
            total_volume: volume,
            total_sets: 3,
            total_reps: 15,
            created_at: Utc::now(),
            exercises: vec![],
        }
    }

    #[test]
    fn test_export_creates_file_with_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("workouts.csv");

        let records = vec![create_test_record(500.0), create_test_record(1000.0)];
        let count = export_history(&records, &csv_path).unwrap();
        assert_eq!(count, 2);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(contents.starts_with("id,date,template"));
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_export_overwrites_previous_snapshot() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("workouts.csv");

        export_history(&[create_test_record(500.0)], &csv_path).unwrap();
        export_history(&[create_test_record(1.0)], &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 1);
    }

    #[test]
    fn test_export_empty_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("workouts.csv");

        let count = export_history(&[], &csv_path).unwrap();
        assert_eq!(count, 0);
        assert!(csv_path.exists());
    }
}
