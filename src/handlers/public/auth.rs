// POST /api/auth - authenticate and receive a token
use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::validation::{FieldError, Validator};
use crate::AppState;

use super::utils::verify_password;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<Value>, ApiError> {
    Validator::new()
        .require_email("email", payload.email.as_deref(), "Please include a valid email")
        .require("password", payload.password.as_deref(), "Password is required")
        .finish()?;

    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    // Unknown email and bad password produce the same response
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&password, &user.password) {
        return Err(invalid_credentials());
    }

    let token = generate_jwt(Claims::new(user.id)).map_err(|e| {
        tracing::error!("token generation failed: {}", e);
        ApiError::server_error()
    })?;

    Ok(Json(json!({ "token": token })))
}

fn invalid_credentials() -> ApiError {
    ApiError::validation_error(vec![FieldError::new("Invalid Credentials", "email")])
}
