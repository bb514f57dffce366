use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireUser;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

/// The catalog is shared, so any authenticated caller may list it.
pub async fn list_exercises(
    _auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let exercises = state
        .store
        .list_exercises()
        .api_err("Failed to list exercises")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(exercises)))
}
