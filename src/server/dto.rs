use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub name: String,
    pub started_at: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub name: String,
    pub started_at: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayParams {
    /// Any instant within the wanted local calendar day; defaults to now.
    #[serde(default)]
    pub date: Option<String>,
}

/// Exactly one of `exercise_id` (existing catalog entry) or `exercise_name`
/// (find-or-create) must be present.
#[derive(Debug, Deserialize)]
pub struct AddExerciseRequest {
    #[serde(default)]
    pub exercise_id: Option<i64>,
    #[serde(default)]
    pub exercise_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSetRequest {
    /// Owning workout, echoed by the client so the right day and detail
    /// views can be invalidated.
    pub workout_id: i64,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub weight: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSetRequest {
    pub workout_id: i64,
    #[serde(default)]
    pub reps: Option<i64>,
    #[serde(default)]
    pub weight: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteSetParams {
    pub workout_id: i64,
}
