// Post resource: posts, likes, and comment sub-documents.
use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{Comment, Like, Post, User};
use crate::validation::Validator;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PostPayload {
    pub text: Option<String>,
}

/// POST /api/posts - create a post with the author's display fields
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Post>, ApiError> {
    Validator::new()
        .require("text", payload.text.as_deref(), "Text is required")
        .finish()?;

    let user = author(&state, auth.user_id).await?;
    let post = Post::new(user.id, payload.text.unwrap_or_default(), user.name, user.avatar);

    Ok(Json(state.store.create_post(post).await?))
}

/// GET /api/posts - every post, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    Ok(Json(state.store.list_posts().await?))
}

/// GET /api/posts/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .store
        .find_post(parse_post_id(&id)?)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(post))
}

/// DELETE /api/posts/:id - author only
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let post = state
        .store
        .find_post(parse_post_id(&id)?)
        .await?
        .ok_or_else(post_not_found)?;

    if post.user != auth.user_id {
        return Err(ApiError::unauthorized("User not authorized"));
    }

    state.store.delete_post(post.id).await?;
    Ok(Json(json!({ "msg": "Post removed" })))
}

/// PUT /api/posts/like/:id - at most one like per user
pub async fn like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let post_id = parse_post_id(&id)?;
    let post = state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    if post.liked_by(auth.user_id) {
        return Err(ApiError::bad_request("Post already liked"));
    }

    let post = state
        .store
        .add_like(post_id, Like { user: auth.user_id })
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(post.likes))
}

/// PUT /api/posts/unlike/:id
pub async fn unlike(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Like>>, ApiError> {
    let post_id = parse_post_id(&id)?;
    let post = state
        .store
        .find_post(post_id)
        .await?
        .ok_or_else(post_not_found)?;

    if !post.liked_by(auth.user_id) {
        return Err(ApiError::bad_request("Post has not yet been liked"));
    }

    let post = state
        .store
        .remove_like(post_id, auth.user_id)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(post.likes))
}

/// POST /api/posts/comment/:id - head-insert a comment
pub async fn comment_add(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<PostPayload>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    Validator::new()
        .require("text", payload.text.as_deref(), "Text is required")
        .finish()?;

    let user = author(&state, auth.user_id).await?;
    let comment = Comment::new(user.id, payload.text.unwrap_or_default(), user.name, user.avatar);

    let post = state
        .store
        .add_comment(parse_post_id(&id)?, comment)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(post.comments))
}

/// DELETE /api/posts/comment/:id/:comment_id - commenter only
pub async fn comment_remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let post = state
        .store
        .find_post(parse_post_id(&id)?)
        .await?
        .ok_or_else(post_not_found)?;

    let comment_id = Uuid::parse_str(&comment_id)
        .map_err(|_| ApiError::not_found("Comment does not exist"))?;
    let comment = post
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or_else(|| ApiError::not_found("Comment does not exist"))?;

    if comment.user != auth.user_id {
        return Err(ApiError::unauthorized("User not authorized"));
    }

    let post = state
        .store
        .remove_comment(post.id, comment_id)
        .await?
        .ok_or_else(post_not_found)?;

    Ok(Json(post.comments))
}

async fn author(state: &AppState, user_id: Uuid) -> Result<User, ApiError> {
    state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

fn parse_post_id(id: &str) -> Result<Uuid, ApiError> {
    // Malformed and unknown ids collapse to the same response
    Uuid::parse_str(id).map_err(|_| post_not_found())
}

fn post_not_found() -> ApiError {
    ApiError::not_found("Post not found")
}
