use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 hash, never serialized into API responses
    #[serde(skip_serializing, default)]
    pub password: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password: String, avatar: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password,
            avatar,
            created_at: Utc::now(),
        }
    }
}
