use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog exercise. Global and shared across users; nobody owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A workout session, owned exclusively by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    #[serde(skip)]
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields for a new workout row.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub user_id: String,
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Mutable workout fields; applied as a full replace.
#[derive(Debug, Clone)]
pub struct WorkoutChanges {
    pub name: Option<String>,
    pub started_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A catalog exercise attached to a workout at a given position.
///
/// `position` is a zero-based append-only sequence per workout: assigned
/// max+1 on insert, never renumbered when siblings are removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub position: i64,
    pub created_at: DateTime<Utc>,
}

/// One set within a workout exercise.
///
/// `set_number` is a one-based append-only sequence per workout exercise;
/// deleting a set leaves a gap rather than renumbering.
/// `weight` holds an exact decimal string (validated at the boundary),
/// never a float.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Set {
    pub id: i64,
    pub workout_exercise_id: i64,
    pub set_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new set row. `set_number` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewSet {
    pub workout_exercise_id: i64,
    pub reps: Option<i64>,
    pub weight: Option<String>,
}

/// Mutable set fields. Both are always written; an absent field clears
/// the column (full-replace semantics).
#[derive(Debug, Clone)]
pub struct SetChanges {
    pub reps: Option<i64>,
    pub weight: Option<String>,
}

/// Bearer token credential bound to an opaque user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// `{id, name}` pair for the day view's exercise summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub id: i64,
    pub name: String,
}

/// A workout enriched with its ordered, distinct exercise summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutWithExercises {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<ExerciseSummary>,
}

/// A workout exercise joined with its catalog name and ordered sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExerciseWithSets {
    pub id: i64,
    pub exercise_id: i64,
    pub exercise_name: String,
    pub position: i64,
    pub sets: Vec<Set>,
}
