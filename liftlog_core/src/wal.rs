//! Write-Ahead Log (WAL) for workout record persistence.
//!
//! Records are appended to a JSONL (JSON Lines) file with file locking to
//! ensure safe concurrent access. Deletes rewrite the whole file atomically;
//! records are small and bounded by one user's lifetime workout count.

use crate::{Error, Result, WorkoutRecord};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Record sink trait for persisting finalized workouts
pub trait RecordSink {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()>;
}

/// JSONL-based record sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl RecordSink for JsonlSink {
    fn append(&mut self, record: &WorkoutRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write record as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended record {} to WAL", record.id);
        Ok(())
    }
}

/// Read all records from a WAL file
///
/// Corrupt lines are skipped with a warning rather than failing the load.
pub fn read_records(path: &Path) -> Result<Vec<WorkoutRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Failed to parse record at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} records from WAL", records.len());
    Ok(records)
}

/// Replace the WAL contents with the given records, atomically.
///
/// Writes to a temp file in the same directory, syncs, then renames over the
/// original. This is the delete path: the in-memory store drops the record
/// and the survivors are written back.
pub fn rewrite_records(path: &Path, records: &[WorkoutRecord]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        Error::State(format!("WAL path {:?} has no parent directory", path))
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        for record in records {
            let line = serde_json::to_string(record)?;
            writer.write_all(line.as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Rewrote WAL with {} records", records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_record() -> WorkoutRecord {
        WorkoutRecord {
            id: Uuid::new_v4(),
            date_label: "Mar 9, 2024".into(),
            template_id: None,
            template_name: None,
            duration_seconds: 600,
            total_volume: 500.0,
            total_sets: 1,
            total_reps: 5,
            created_at: Utc::now(),
            exercises: vec![],
        }
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let record = create_test_record();
        let record_id = record.id;

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&record).unwrap();

        let records = read_records(&wal_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record_id);
    }

    #[test]
    fn test_append_multiple_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        for _ in 0..5 {
            sink.append(&create_test_record()).unwrap();
        }

        let records = read_records(&wal_path).unwrap();
        assert_eq!(records.len(), 5);
    }

    #[test]
    fn test_read_empty_wal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("nonexistent.wal");

        let records = read_records(&wal_path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&create_test_record()).unwrap();

        // Inject a corrupt line between two valid ones
        {
            let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
            file.write_all(b"{ not json }\n").unwrap();
        }
        sink.append(&create_test_record()).unwrap();

        let records = read_records(&wal_path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_rewrite_drops_deleted_records() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        let keep = create_test_record();
        let removed = create_test_record();
        let mut sink = JsonlSink::new(&wal_path);
        sink.append(&keep).unwrap();
        sink.append(&removed).unwrap();

        rewrite_records(&wal_path, &[keep.clone()]).unwrap();

        let records = read_records(&wal_path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, keep.id);
    }

    #[test]
    fn test_rewrite_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let wal_path = temp_dir.path().join("test.wal");

        rewrite_records(&wal_path, &[create_test_record()]).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "test.wal")
            .collect();
        assert!(extras.is_empty(), "stray files: {:?}", extras);
    }
}
