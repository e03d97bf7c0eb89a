//! Default catalog of exercise and workout templates.
//!
//! The catalog is a read-only collaborator: the session controller seeds new
//! sessions from workout templates and resolves exercise templates by id.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in exercise and workout templates
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog
/// creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn exercise(id: &str, name: &str, muscle_group: MuscleGroup, default_sets: u32) -> ExerciseTemplate {
    ExerciseTemplate {
        id: id.into(),
        name: name.into(),
        muscle_group,
        default_sets,
    }
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let mut exercises = HashMap::new();
    let mut workouts = HashMap::new();

    // ========================================================================
    // Exercise Templates
    // ========================================================================

    for template in [
        exercise("bench_press", "Bench Press", MuscleGroup::Chest, 3),
        exercise("incline_dumbbell_press", "Incline Dumbbell Press", MuscleGroup::Chest, 3),
        exercise("overhead_press", "Overhead Press", MuscleGroup::Shoulders, 3),
        exercise("lateral_raise", "Lateral Raise", MuscleGroup::Shoulders, 3),
        exercise("squat", "Back Squat", MuscleGroup::Legs, 3),
        exercise("romanian_deadlift", "Romanian Deadlift", MuscleGroup::Legs, 3),
        exercise("deadlift", "Deadlift", MuscleGroup::Back, 3),
        exercise("barbell_row", "Barbell Row", MuscleGroup::Back, 3),
        exercise("pull_up", "Pull-up", MuscleGroup::Back, 3),
        exercise("bicep_curl", "Bicep Curl", MuscleGroup::Arms, 3),
        exercise("tricep_pushdown", "Tricep Pushdown", MuscleGroup::Arms, 3),
        exercise("plank", "Plank", MuscleGroup::Core, 3),
    ] {
        exercises.insert(template.id.clone(), template);
    }

    // ========================================================================
    // Workout Templates
    // ========================================================================

    workouts.insert(
        "push_day".into(),
        WorkoutTemplate {
            id: "push_day".into(),
            name: "Push Day".into(),
            exercises: vec![
                "bench_press".into(),
                "incline_dumbbell_press".into(),
                "overhead_press".into(),
                "tricep_pushdown".into(),
            ],
        },
    );

    workouts.insert(
        "pull_day".into(),
        WorkoutTemplate {
            id: "pull_day".into(),
            name: "Pull Day".into(),
            exercises: vec![
                "deadlift".into(),
                "barbell_row".into(),
                "pull_up".into(),
                "bicep_curl".into(),
            ],
        },
    );

    workouts.insert(
        "leg_day".into(),
        WorkoutTemplate {
            id: "leg_day".into(),
            name: "Leg Day".into(),
            exercises: vec![
                "squat".into(),
                "romanian_deadlift".into(),
                "plank".into(),
            ],
        },
    );

    workouts.insert(
        "full_body".into(),
        WorkoutTemplate {
            id: "full_body".into(),
            name: "Full Body".into(),
            exercises: vec![
                "squat".into(),
                "bench_press".into(),
                "barbell_row".into(),
                "overhead_press".into(),
            ],
        },
    );

    Catalog {
        exercises,
        workouts,
    }
}

impl Catalog {
    /// Look up an exercise template by id
    pub fn exercise(&self, id: &str) -> Option<&ExerciseTemplate> {
        self.exercises.get(id)
    }

    /// Look up a workout template by id
    pub fn workout(&self, id: &str) -> Option<&WorkoutTemplate> {
        self.workouts.get(id)
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, template) in &self.exercises {
            if id.is_empty() || template.id.is_empty() {
                errors.push("Exercise template has empty ID".to_string());
            }
            if id != &template.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match template.id '{}'",
                    id, template.id
                ));
            }
            if template.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
            if template.default_sets == 0 {
                errors.push(format!("Exercise '{}' has zero default sets", id));
            }
        }

        for (id, workout) in &self.workouts {
            if id.is_empty() || workout.id.is_empty() {
                errors.push("Workout template has empty ID".to_string());
            }
            if id != &workout.id {
                errors.push(format!(
                    "Workout key '{}' doesn't match template.id '{}'",
                    id, workout.id
                ));
            }
            if workout.name.is_empty() {
                errors.push(format!("Workout '{}' has empty name", id));
            }
            if workout.exercises.is_empty() {
                errors.push(format!("Workout '{}' has no exercises", id));
            }

            // Check that all referenced exercise templates exist
            for exercise_id in &workout.exercises {
                if !self.exercises.contains_key(exercise_id) {
                    errors.push(format!(
                        "Workout '{}' references non-existent exercise '{}'",
                        id, exercise_id
                    ));
                }
            }
        }

        if self.workouts.is_empty() {
            errors.push("Catalog has no workout templates".to_string());
        }

        errors
    }
}
