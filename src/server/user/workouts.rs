use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Local, Utc};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::cache::{dashboard_key, dashboard_prefix, workout_key};
use crate::server::dto::{CreateWorkoutRequest, DayParams, UpdateWorkoutRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{
    parse_timestamp, validate_id, validate_notes, validate_workout_name,
};
use crate::types::{NewWorkout, WorkoutChanges};

pub async fn create_workout(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWorkoutRequest>,
) -> impl IntoResponse {
    validate_workout_name(&req.name)?;
    validate_notes(req.notes.as_deref())?;
    let started_at = parse_timestamp(&req.started_at, "Start time")?;

    let workout = state
        .store
        .create_workout(&NewWorkout {
            user_id: auth.user_id.clone(),
            name: Some(req.name),
            started_at,
            notes: req.notes,
        })
        .api_err("Failed to create workout")?;

    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(workout))))
}

pub async fn list_workouts_for_day(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<DayParams>,
) -> impl IntoResponse {
    let date = match params.date.as_deref() {
        Some(raw) => parse_timestamp(raw, "Date")?,
        None => Utc::now(),
    };

    let key = dashboard_key(&auth.user_id, date.with_timezone(&Local).date_naive());
    if let Some(cached) = state.views.get(&key) {
        return Ok::<_, ApiError>(Json(ApiResponse::success(cached)));
    }

    let workouts = state
        .store
        .list_workouts_for_day(&auth.user_id, date)
        .api_err("Failed to list workouts")?;

    let view = serde_json::to_value(&workouts)
        .map_err(|_| ApiError::internal("Failed to render workouts"))?;
    state.views.put(key, view.clone());

    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

pub async fn get_workout(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    validate_id(id, "Workout")?;

    let workout = state
        .store
        .get_workout(id, &auth.user_id)
        .api_err("Failed to get workout")?
        .or_not_found("Workout not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(workout)))
}

pub async fn update_workout(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateWorkoutRequest>,
) -> impl IntoResponse {
    validate_id(id, "Workout")?;
    validate_workout_name(&req.name)?;
    validate_notes(req.notes.as_deref())?;
    let started_at = parse_timestamp(&req.started_at, "Start time")?;

    let workout = state
        .store
        .update_workout(
            id,
            &auth.user_id,
            &WorkoutChanges {
                name: Some(req.name),
                started_at,
                notes: req.notes,
            },
        )
        .api_err("Failed to update workout")?
        .or_not_found("Workout not found")?;

    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));
    state.views.invalidate(&workout_key(id));

    Ok::<_, ApiError>(Json(ApiResponse::success(workout)))
}
