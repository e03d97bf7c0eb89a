//! Session controller: owns the single mutable active session.
//!
//! All mutation of an in-progress workout goes through [`SessionManager`]:
//! - Starting (from a workout template or free-form) and cancelling
//! - Exercise and set CRUD with raw-text weight/reps
//! - The two-stage complete/delete affordance on sets
//!
//! Set completion is announced on an explicit notification channel; the rest
//! timer subscribes to it rather than being called directly.

use crate::{ActiveSession, Catalog, ExerciseInSession, ExerciseTemplate, MuscleGroup, SetEntry, WorkoutTemplate};
use chrono::Utc;
use std::sync::mpsc::{channel, Receiver, Sender};
use uuid::Uuid;

/// Editable raw-text field on a set
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetField {
    Weight,
    Reps,
}

/// What the single set-row affordance did when invoked.
///
/// The same action means "complete" on a pending set and "delete" on a set
/// that is already completed. This is a two-stage semantic, not a boolean
/// toggle: invoking it twice removes the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetAction {
    Completed,
    Deleted,
}

/// Signals emitted by the session controller
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionSignal {
    /// A pending set was marked completed
    SetCompleted { exercise_id: String, set_id: Uuid },
}

/// Owns the optional active session and broadcasts completion signals.
///
/// Exactly one session exists at a time; starting a new one replaces any
/// existing session without confirmation, so callers must guard against
/// accidental loss. Mutations targeting unknown exercise or set ids are
/// silent no-ops.
#[derive(Debug, Default)]
pub struct SessionManager {
    active: Option<ActiveSession>,
    subscribers: Vec<Sender<SessionSignal>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to session signals.
    ///
    /// Disconnected receivers are pruned on the next send.
    pub fn subscribe(&mut self) -> Receiver<SessionSignal> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    /// Snapshot of the in-progress session, if any
    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    /// Remove and return the active session (the finalizer's entry point)
    pub fn take_active(&mut self) -> Option<ActiveSession> {
        self.active.take()
    }

    /// Start a session seeded from a workout template.
    ///
    /// Each exercise in the template becomes an [`ExerciseInSession`] carrying
    /// the stable catalog id, with one empty pending set. Template entries
    /// that don't resolve in the catalog are skipped.
    pub fn start_from_template(
        &mut self,
        template: &WorkoutTemplate,
        catalog: &Catalog,
    ) -> &ActiveSession {
        let exercises = template
            .exercises
            .iter()
            .filter_map(|id| match catalog.exercise(id) {
                Some(exercise) => Some(ExerciseInSession {
                    id: exercise.id.clone(),
                    name: exercise.name.clone(),
                    muscle_group: exercise.muscle_group,
                    expanded: true,
                    sets: vec![SetEntry::new()],
                }),
                None => {
                    tracing::warn!("Template {} references unknown exercise {}", template.id, id);
                    None
                }
            })
            .collect();

        self.replace_session(ActiveSession {
            id: Uuid::new_v4(),
            name: template.name.clone(),
            started_at: Utc::now(),
            template_id: Some(template.id.clone()),
            exercises,
        })
    }

    /// Start a free session with no seeded exercises
    pub fn start_free(&mut self, name: &str) -> &ActiveSession {
        self.replace_session(ActiveSession {
            id: Uuid::new_v4(),
            name: name.to_string(),
            started_at: Utc::now(),
            template_id: None,
            exercises: Vec::new(),
        })
    }

    fn replace_session(&mut self, session: ActiveSession) -> &ActiveSession {
        if let Some(old) = &self.active {
            tracing::info!("Replacing active session {} without finalizing it", old.id);
        }
        self.active.insert(session)
    }

    /// Discard the active session with no record created.
    ///
    /// Returns false when nothing was active.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(session) => {
                tracing::info!("Cancelled session {}", session.id);
                true
            }
            None => false,
        }
    }

    /// Append a catalog exercise with zero sets, preserving insertion order
    pub fn add_exercise(&mut self, template: &ExerciseTemplate) {
        if let Some(session) = self.active.as_mut() {
            session.exercises.push(ExerciseInSession {
                id: template.id.clone(),
                name: template.name.clone(),
                muscle_group: template.muscle_group,
                expanded: true,
                sets: Vec::new(),
            });
        }
    }

    /// Append a custom exercise (generated id) with zero sets
    pub fn add_custom_exercise(&mut self, name: &str, muscle_group: MuscleGroup) {
        if let Some(session) = self.active.as_mut() {
            session.exercises.push(ExerciseInSession {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                muscle_group,
                expanded: true,
                sets: Vec::new(),
            });
        }
    }

    /// Append an empty pending set to an exercise
    pub fn add_set(&mut self, exercise_id: &str) {
        match self.exercise_mut(exercise_id) {
            Some(exercise) => exercise.sets.push(SetEntry::new()),
            None => tracing::debug!("add_set: unknown exercise {}", exercise_id),
        }
    }

    /// Store raw text for weight or reps.
    ///
    /// No numeric validation happens here; the text stays editable until
    /// finalize, where invalid input parses to zero.
    pub fn update_set(&mut self, exercise_id: &str, set_id: Uuid, field: SetField, value: &str) {
        let Some(set) = self.set_mut(exercise_id, set_id) else {
            tracing::debug!("update_set: unknown target {}/{}", exercise_id, set_id);
            return;
        };
        match field {
            SetField::Weight => set.weight = value.to_string(),
            SetField::Reps => set.reps = value.to_string(),
        }
    }

    /// The single set-row affordance: complete a pending set, delete a
    /// completed one.
    ///
    /// Completing emits [`SessionSignal::SetCompleted`]. Returns what happened,
    /// or None for unknown ids.
    pub fn complete_set(&mut self, exercise_id: &str, set_id: Uuid) -> Option<SetAction> {
        let was_completed = {
            let set = self.set_mut(exercise_id, set_id)?;
            let was_completed = set.completed;
            if !was_completed {
                set.completed = true;
            }
            was_completed
        };

        if was_completed {
            self.delete_set(exercise_id, set_id);
            Some(SetAction::Deleted)
        } else {
            self.emit(SessionSignal::SetCompleted {
                exercise_id: exercise_id.to_string(),
                set_id,
            });
            Some(SetAction::Completed)
        }
    }

    /// Remove a set entry.
    ///
    /// Displayed set numbers derive from list position, so the remaining sets
    /// renumber implicitly.
    pub fn delete_set(&mut self, exercise_id: &str, set_id: Uuid) -> bool {
        let Some(exercise) = self.exercise_mut(exercise_id) else {
            return false;
        };
        let before = exercise.sets.len();
        exercise.sets.retain(|s| s.id != set_id);
        before != exercise.sets.len()
    }

    /// Flip the display-only expanded flag
    pub fn toggle_expanded(&mut self, exercise_id: &str) {
        if let Some(exercise) = self.exercise_mut(exercise_id) {
            exercise.expanded = !exercise.expanded;
        }
    }

    fn exercise_mut(&mut self, exercise_id: &str) -> Option<&mut ExerciseInSession> {
        self.active
            .as_mut()?
            .exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
    }

    fn set_mut(&mut self, exercise_id: &str, set_id: Uuid) -> Option<&mut SetEntry> {
        self.exercise_mut(exercise_id)?
            .sets
            .iter_mut()
            .find(|s| s.id == set_id)
    }

    fn emit(&mut self, signal: SessionSignal) {
        self.subscribers
            .retain(|tx| tx.send(signal.clone()).is_ok());
    }
}
