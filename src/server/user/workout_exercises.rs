use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::cache::{dashboard_prefix, workout_key};
use crate::server::dto::AddExerciseRequest;
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_exercise_name, validate_id};
use crate::types::Exercise;

pub async fn list_workout_exercises(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(workout_id): Path<i64>,
) -> impl IntoResponse {
    validate_id(workout_id, "Workout")?;

    // An unowned workout must 404 here; the store's empty-list answer alone
    // would be indistinguishable from a workout with no exercises yet.
    state
        .store
        .get_workout(workout_id, &auth.user_id)
        .api_err("Failed to get workout")?
        .or_not_found("Workout not found")?;

    let key = workout_key(workout_id);
    if let Some(cached) = state.views.get(&key) {
        return Ok::<_, ApiError>(Json(ApiResponse::success(cached)));
    }

    let exercises = state
        .store
        .list_exercises_with_sets(workout_id, &auth.user_id)
        .api_err("Failed to list workout exercises")?;

    let view = serde_json::to_value(&exercises)
        .map_err(|_| ApiError::internal("Failed to render workout exercises"))?;
    state.views.put(key, view.clone());

    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

/// Resolves the request to a catalog exercise: an explicit id must exist; a
/// name is found case-insensitively or created on the spot.
fn resolve_exercise(
    state: &AppState,
    req: &AddExerciseRequest,
) -> Result<Exercise, ApiError> {
    match (&req.exercise_id, &req.exercise_name) {
        (Some(id), None) => {
            validate_id(*id, "Exercise")?;
            state
                .store
                .get_exercise(*id)
                .api_err("Failed to get exercise")?
                .or_not_found("Exercise not found")
        }
        (None, Some(name)) => {
            validate_exercise_name(name)?;
            let name = name.trim();

            if let Some(existing) = state
                .store
                .get_exercise_by_name(name)
                .api_err("Failed to look up exercise")?
            {
                return Ok(existing);
            }

            match state.store.create_exercise(name) {
                Ok(created) => Ok(created),
                // Lost a create race; the winner's row is the one we want
                Err(Error::AlreadyExists) => state
                    .store
                    .get_exercise_by_name(name)
                    .api_err("Failed to look up exercise")?
                    .or_not_found("Exercise not found"),
                Err(e) => Err(e).api_err("Failed to create exercise"),
            }
        }
        _ => Err(ApiError::bad_request(
            "Provide exactly one of exercise_id or exercise_name",
        )),
    }
}

pub async fn add_exercise(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(workout_id): Path<i64>,
    Json(req): Json<AddExerciseRequest>,
) -> impl IntoResponse {
    validate_id(workout_id, "Workout")?;

    let exercise = resolve_exercise(&state, &req)?;

    let link = state
        .store
        .add_exercise_to_workout(workout_id, exercise.id, &auth.user_id)
        .api_err("Failed to add exercise to workout")?
        .or_not_found("Workout not found")?;

    state.views.invalidate(&workout_key(workout_id));
    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(link))))
}

pub async fn remove_exercise(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    validate_id(id, "Workout exercise")?;

    let link = state
        .store
        .remove_exercise_from_workout(id, &auth.user_id)
        .api_err("Failed to remove exercise from workout")?
        .or_not_found("Workout exercise not found")?;

    state.views.invalidate(&workout_key(link.workout_id));
    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
