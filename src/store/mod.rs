mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Every operation that touches owned data takes the caller's `user_id` and
/// resolves ownership inside the same statement that reads or mutates, so a
/// row another user owns is indistinguishable from a row that does not exist.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Exercise catalog operations (global, unscoped)
    fn list_exercises(&self) -> Result<Vec<Exercise>>;
    fn get_exercise(&self, id: i64) -> Result<Option<Exercise>>;
    fn get_exercise_by_name(&self, name: &str) -> Result<Option<Exercise>>;
    fn create_exercise(&self, name: &str) -> Result<Exercise>;

    // Workout operations
    fn create_workout(&self, workout: &NewWorkout) -> Result<Workout>;
    fn get_workout(&self, id: i64, user_id: &str) -> Result<Option<Workout>>;
    fn list_workouts_for_day(
        &self,
        user_id: &str,
        date: DateTime<Utc>,
    ) -> Result<Vec<WorkoutWithExercises>>;
    fn update_workout(
        &self,
        id: i64,
        user_id: &str,
        changes: &WorkoutChanges,
    ) -> Result<Option<Workout>>;

    // Workout-exercise link operations (ownership via the parent workout)
    fn add_exercise_to_workout(
        &self,
        workout_id: i64,
        exercise_id: i64,
        user_id: &str,
    ) -> Result<Option<WorkoutExercise>>;
    fn list_exercises_with_sets(
        &self,
        workout_id: i64,
        user_id: &str,
    ) -> Result<Vec<WorkoutExerciseWithSets>>;
    fn remove_exercise_from_workout(
        &self,
        workout_exercise_id: i64,
        user_id: &str,
    ) -> Result<Option<WorkoutExercise>>;

    // Set operations (ownership via link -> workout)
    fn create_set(&self, set: &NewSet, user_id: &str) -> Result<Option<Set>>;
    fn update_set(
        &self,
        set_id: i64,
        changes: &SetChanges,
        user_id: &str,
    ) -> Result<Option<Set>>;
    fn delete_set(&self, set_id: i64, user_id: &str) -> Result<Option<Set>>;

    // Token operations
    fn create_access_token(&self, token: &AccessToken) -> Result<()>;
    fn get_access_token_by_lookup(&self, lookup: &str) -> Result<Option<AccessToken>>;
    fn update_access_token_last_used(&self, id: &str) -> Result<()>;
    fn has_access_tokens(&self) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
