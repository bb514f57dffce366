mod exercises;
mod sets;
mod workout_exercises;
mod workouts;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn user_router() -> Router<Arc<AppState>> {
    Router::new()
        // Workouts
        .route("/workouts", post(workouts::create_workout))
        .route("/workouts", get(workouts::list_workouts_for_day))
        .route("/workouts/{id}", get(workouts::get_workout))
        .route("/workouts/{id}", put(workouts::update_workout))
        // Exercises within a workout
        .route(
            "/workouts/{id}/exercises",
            get(workout_exercises::list_workout_exercises),
        )
        .route(
            "/workouts/{id}/exercises",
            post(workout_exercises::add_exercise),
        )
        .route(
            "/workout-exercises/{id}",
            delete(workout_exercises::remove_exercise),
        )
        // Sets
        .route("/workout-exercises/{id}/sets", post(sets::create_set))
        .route("/sets/{id}", put(sets::update_set))
        .route("/sets/{id}", delete(sets::delete_set))
        // Exercise catalog
        .route("/exercises", get(exercises::list_exercises))
}
