use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::cache::{dashboard_prefix, workout_key};
use crate::server::dto::{CreateSetRequest, DeleteSetParams, UpdateSetRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{validate_id, validate_reps, validate_weight};
use crate::types::{NewSet, SetChanges};

// The client echoes workout_id on set mutations (as it does for view
// refreshes in general); it only scopes cache invalidation, never
// authorization, which rides the ownership join inside the store.

pub async fn create_set(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(workout_exercise_id): Path<i64>,
    Json(req): Json<CreateSetRequest>,
) -> impl IntoResponse {
    validate_id(workout_exercise_id, "Workout exercise")?;
    validate_id(req.workout_id, "Workout")?;
    validate_reps(req.reps)?;
    validate_weight(req.weight.as_deref())?;

    let set = state
        .store
        .create_set(
            &NewSet {
                workout_exercise_id,
                reps: req.reps,
                weight: req.weight,
            },
            &auth.user_id,
        )
        .api_err("Failed to create set")?
        .or_not_found("Workout exercise not found")?;

    state.views.invalidate(&workout_key(req.workout_id));
    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(set))))
}

pub async fn update_set(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSetRequest>,
) -> impl IntoResponse {
    validate_id(id, "Set")?;
    validate_id(req.workout_id, "Workout")?;
    validate_reps(req.reps)?;
    validate_weight(req.weight.as_deref())?;

    // Full replace: an omitted field clears the stored value
    let set = state
        .store
        .update_set(
            id,
            &SetChanges {
                reps: req.reps,
                weight: req.weight,
            },
            &auth.user_id,
        )
        .api_err("Failed to update set")?
        .or_not_found("Set not found")?;

    state.views.invalidate(&workout_key(req.workout_id));
    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));

    Ok::<_, ApiError>(Json(ApiResponse::success(set)))
}

pub async fn delete_set(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<DeleteSetParams>,
) -> impl IntoResponse {
    validate_id(id, "Set")?;
    validate_id(params.workout_id, "Workout")?;

    state
        .store
        .delete_set(id, &auth.user_id)
        .api_err("Failed to delete set")?
        .or_not_found("Set not found")?;

    state.views.invalidate(&workout_key(params.workout_id));
    state.views.invalidate_prefix(&dashboard_prefix(&auth.user_id));

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
