// Profile resource: aggregate upsert, owner-expanded lookups, nested
// experience/education mutation, and the cascading account delete.
use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::format::profile_with_owner;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{Education, Experience, Profile, Social};
use crate::store::ProfileUpdate;
use crate::validation::{parse_skills, Validator};
use crate::AppState;

/// GET /api/profile/me - the caller's profile, owner expanded
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let expanded = state
        .store
        .find_profile_expanded(auth.user_id)
        .await?
        .ok_or_else(no_profile)?;

    Ok(Json(profile_with_owner(&expanded)))
}

/// Flat create-or-update payload. Every field is optional at the transport
/// level; `Option` distinguishes "absent from the payload" from any sent
/// value, including empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProfilePayload {
    pub company: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
}

/// POST /api/profile - create or update the caller's profile
pub async fn upsert(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ProfilePayload>,
) -> Result<Json<Profile>, ApiError> {
    Validator::new()
        .require("status", payload.status.as_deref(), "Status is required")
        .require("skills", payload.skills.as_deref(), "Skills is required")
        .finish()?;

    let update = ProfileUpdate {
        company: payload.company,
        location: payload.location,
        website: payload.website,
        bio: payload.bio,
        status: payload.status,
        githubusername: payload.githubusername,
        skills: payload.skills.as_deref().map(parse_skills),
        social: Social {
            youtube: payload.youtube,
            twitter: payload.twitter,
            instagram: payload.instagram,
            linkedin: payload.linkedin,
            facebook: payload.facebook,
        },
    };

    let profile = state.store.upsert_profile(auth.user_id, update).await?;
    Ok(Json(profile))
}

/// GET /api/profile - every profile, owner expanded
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let profiles = state.store.list_profiles_expanded().await?;
    Ok(Json(profiles.iter().map(profile_with_owner).collect()))
}

/// GET /api/profile/user/:user_id - profile by user id.
///
/// A malformed id and a valid id with no profile produce the same 404.
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user_id =
        Uuid::parse_str(&user_id).map_err(|_| ApiError::not_found("Profile not found"))?;

    let expanded = state
        .store
        .find_profile_expanded(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(Json(profile_with_owner(&expanded)))
}

/// DELETE /api/profile - cascade delete posts, profile, then the user
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    state.store.delete_user_cascade(auth.user_id).await?;
    Ok(Json(json!({ "msg": "User deleted" })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExperiencePayload {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

/// PUT /api/profile/experience - head-insert a work history entry
pub async fn experience_add(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ExperiencePayload>,
) -> Result<Json<Profile>, ApiError> {
    Validator::new()
        .require("title", payload.title.as_deref(), "Title is required")
        .require("company", payload.company.as_deref(), "Company is required")
        .require("from", payload.from.as_deref(), "From date is required")
        .finish()?;

    let entry = Experience {
        id: Uuid::new_v4(),
        title: payload.title.unwrap_or_default(),
        company: payload.company.unwrap_or_default(),
        location: payload.location,
        from_date: payload.from.unwrap_or_default(),
        to_date: payload.to,
        current: payload.current,
        description: payload.description,
    };

    let profile = state
        .store
        .add_experience(auth.user_id, entry)
        .await?
        .ok_or_else(no_profile)?;

    Ok(Json(profile))
}

/// DELETE /api/profile/experience/:exp_id - remove an entry by id.
///
/// A malformed or unknown id is a no-op: the profile comes back unchanged.
pub async fn experience_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(exp_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = match Uuid::parse_str(&exp_id) {
        Ok(entry_id) => state.store.remove_experience(auth.user_id, entry_id).await?,
        Err(_) => state.store.find_profile_by_user(auth.user_id).await?,
    };

    Ok(Json(profile.ok_or_else(no_profile)?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EducationPayload {
    pub school: Option<String>,
    pub degree: Option<String>,
    pub fieldofstudy: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

/// PUT /api/profile/education - head-insert an education entry
pub async fn education_add(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<EducationPayload>,
) -> Result<Json<Profile>, ApiError> {
    Validator::new()
        .require("school", payload.school.as_deref(), "School is required")
        .require("degree", payload.degree.as_deref(), "Degree is required")
        .require(
            "fieldofstudy",
            payload.fieldofstudy.as_deref(),
            "Field of study is required",
        )
        .finish()?;

    let entry = Education {
        id: Uuid::new_v4(),
        school: payload.school.unwrap_or_default(),
        degree: payload.degree.unwrap_or_default(),
        fieldofstudy: payload.fieldofstudy.unwrap_or_default(),
        from_date: payload.from.unwrap_or_default(),
        to_date: payload.to,
        current: payload.current,
        description: payload.description,
    };

    let profile = state
        .store
        .add_education(auth.user_id, entry)
        .await?
        .ok_or_else(no_profile)?;

    Ok(Json(profile))
}

/// DELETE /api/profile/education/:edu_id - remove an entry by id
pub async fn education_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(edu_id): Path<String>,
) -> Result<Json<Profile>, ApiError> {
    let profile = match Uuid::parse_str(&edu_id) {
        Ok(entry_id) => state.store.remove_education(auth.user_id, entry_id).await?,
        Err(_) => state.store.find_profile_by_user(auth.user_id).await?,
    };

    Ok(Json(profile.ok_or_else(no_profile)?))
}

fn no_profile() -> ApiError {
    ApiError::not_found("There is no profile for this user")
}
