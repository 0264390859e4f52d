// POST /api/users - register a new account
use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::models::User;
use crate::store::StoreError;
use crate::validation::{FieldError, Validator};
use crate::AppState;

use super::utils::{gravatar_url, hash_password};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Create a user account and return a signed token for it.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<Value>, ApiError> {
    Validator::new()
        .require("name", payload.name.as_deref(), "Name is required")
        .require_email("email", payload.email.as_deref(), "Please include a valid email")
        .require_min_length(
            "password",
            payload.password.as_deref(),
            6,
            "Please enter a password with 6 or more characters",
        )
        .finish()?;

    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(user_exists());
    }

    let avatar = gravatar_url(&email);
    let user = User::new(name, email, hash_password(&password)?, Some(avatar));

    let user = state.store.create_user(user).await.map_err(|e| match e {
        // Lost the race against a concurrent registration for the same email
        StoreError::Duplicate(_) => user_exists(),
        other => other.into(),
    })?;

    let token = generate_jwt(Claims::new(user.id)).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::server_error()
    })?;

    Ok(Json(json!({ "token": token })))
}

fn user_exists() -> ApiError {
    ApiError::validation_error(vec![FieldError::new("User already exists", "email")])
}
