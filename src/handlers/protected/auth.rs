// GET /api/auth - the caller's user record
use axum::{extract::State, response::Json, Extension};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::AppState;

/// Password is never serialized, so the raw record is safe to return.
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user))
}
