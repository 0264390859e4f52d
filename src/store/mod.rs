pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Comment, Education, Experience, Like, Post, Profile, Social, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owner display fields joined onto a profile when the caller asks for the
/// expanded form.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRef {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileWithOwner {
    pub profile: Profile,
    pub owner: OwnerRef,
}

/// Write model for create-or-update profile.
///
/// `None` means "absent from the payload, leave untouched"; `Some` is written
/// even when the value is an empty string. `social` does not follow the
/// partial-update rule: it replaces the stored object wholesale, so fields
/// omitted from the current request are dropped. That asymmetry is part of
/// the API contract.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub company: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub status: Option<String>,
    pub githubusername: Option<String>,
    pub skills: Option<Vec<String>>,
    pub social: Social,
}

impl ProfileUpdate {
    /// Merge present fields into an existing profile; `social` is replaced.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(v) = &self.company {
            profile.company = Some(v.clone());
        }
        if let Some(v) = &self.location {
            profile.location = Some(v.clone());
        }
        if let Some(v) = &self.website {
            profile.website = Some(v.clone());
        }
        if let Some(v) = &self.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &self.status {
            profile.status = v.clone();
        }
        if let Some(v) = &self.githubusername {
            profile.githubusername = Some(v.clone());
        }
        if let Some(v) = &self.skills {
            profile.skills = v.clone();
        }
        profile.social = self.social.clone();
        profile.updated_at = chrono::Utc::now();
    }

    /// Build a fresh profile for a user with no existing one. Validation has
    /// already guaranteed `status` and `skills` are present.
    pub fn into_new_profile(self, user_id: Uuid) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user: user_id,
            company: self.company,
            location: self.location,
            website: self.website,
            bio: self.bio,
            status: self.status.unwrap_or_default(),
            githubusername: self.githubusername,
            skills: self.skills.unwrap_or_default(),
            social: self.social,
            experience: Vec::new(),
            education: Vec::new(),
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Document-store boundary over the three collections (users, profiles,
/// posts). Opened at process start, closed at shutdown; implementations must
/// serialize the read-modify-write on profile sub-document sequences per
/// user so concurrent inserts are never lost.
#[async_trait]
pub trait Store: Send + Sync {
    /// Connectivity ping for the health endpoint
    async fn health(&self) -> Result<(), StoreError>;

    /// Release connections on shutdown
    async fn close(&self);

    // -- users

    async fn create_user(&self, user: User) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    // -- profiles

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError>;
    async fn find_profile_expanded(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProfileWithOwner>, StoreError>;
    async fn list_profiles_expanded(&self) -> Result<Vec<ProfileWithOwner>, StoreError>;

    /// Create-if-absent, merge-if-present keyed on the user id
    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError>;

    /// Head-insert; `None` when the user has no profile
    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: Experience,
    ) -> Result<Option<Profile>, StoreError>;

    /// Remove by entry id; unknown ids are a no-op. `None` when the user has
    /// no profile.
    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<Profile>, StoreError>;

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: Education,
    ) -> Result<Option<Profile>, StoreError>;

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<Profile>, StoreError>;

    /// Delete the user's posts, then profile, then the user record itself,
    /// atomically where the backend supports it
    async fn delete_user_cascade(&self, user_id: Uuid) -> Result<(), StoreError>;

    // -- posts

    async fn create_post(&self, post: Post) -> Result<Post, StoreError>;

    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;
    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError>;

    async fn add_like(&self, post_id: Uuid, like: Like) -> Result<Option<Post>, StoreError>;
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid)
        -> Result<Option<Post>, StoreError>;
    async fn add_comment(
        &self,
        post_id: Uuid,
        comment: Comment,
    ) -> Result<Option<Post>, StoreError>;
    async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Post>, StoreError>;
}
