//! Achievement book persistence with file locking.
//!
//! Unlock state and accrued points persist for the lifetime of the user
//! profile. Saves are atomic (temp file + rename) and loads degrade to the
//! default book on missing or corrupted files - a broken state file must
//! never take the engine down.

use crate::{AchievementBook, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl AchievementBook {
    /// Load the achievement book from a file with shared locking
    ///
    /// Returns the default book if the file doesn't exist or is corrupted.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No achievement file found, using default book");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open achievement file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock achievement file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read achievement file {:?}: {}. Using defaults.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<AchievementBook>(&contents) {
            Ok(book) => {
                tracing::debug!("Loaded achievement book from {:?}", path);
                Ok(book)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse achievement file {:?}: {}. Using defaults.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the achievement book with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "achievement path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old state file
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved achievement book to {:?}", path);
        Ok(())
    }

    /// Load the book, modify it, and save it back atomically
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut AchievementBook) -> Result<()>,
    {
        let mut book = Self::load(path)?;
        f(&mut book)?;
        book.save(path)?;
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WorkoutStats;
    use chrono::Utc;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("achievements.json");

        let mut book = AchievementBook::default();
        let stats = WorkoutStats {
            total_workouts: 1,
            ..WorkoutStats::default()
        };
        book.check(&stats, 3, Utc::now());

        book.save(&state_path).unwrap();
        let loaded = AchievementBook::load(&state_path).unwrap();

        assert_eq!(loaded.total_points, book.total_points);
        assert!(loaded
            .achievements
            .iter()
            .any(|a| a.id == "first_workout" && a.unlocked));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("nonexistent.json");

        let book = AchievementBook::load(&state_path).unwrap();
        assert_eq!(book.total_points, 0);
        assert_eq!(book.unlocked().count(), 0);
    }

    #[test]
    fn test_corrupted_state_falls_back_to_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("corrupted.json");

        std::fs::write(&state_path, "{ invalid json }").unwrap();

        let book = AchievementBook::load(&state_path).unwrap();
        assert_eq!(book.total_points, 0);
        assert_eq!(book.unlocked().count(), 0);
    }

    #[test]
    fn test_update_pattern() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("achievements.json");

        AchievementBook::default().save(&state_path).unwrap();

        AchievementBook::update(&state_path, |book| {
            book.total_points = 150;
            Ok(())
        })
        .unwrap();

        let loaded = AchievementBook::load(&state_path).unwrap();
        assert_eq!(loaded.total_points, 150);
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state_path = temp_dir.path().join("achievements.json");

        AchievementBook::default().save(&state_path).unwrap();

        assert!(state_path.exists());
        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "achievements.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only achievements.json, found extras: {:?}",
            extras
        );
    }
}
