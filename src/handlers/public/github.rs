// GET /api/profile/github/:username - recent repositories for an account
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::AppState;

/// Pass the upstream repository list through verbatim; any upstream failure
/// is normalized by the adapter's error conversion.
pub async fn repos(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let repos = state.github.recent_repos(&username).await?;
    Ok(Json(repos))
}
