use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post authored by a user. Author name/avatar are denormalized at creation
/// time so posts stay renderable after profile edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn new(user: Uuid, text: String, name: String, avatar: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text,
            name,
            avatar,
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        }
    }

    pub fn liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|like| like.user == user_id)
    }
}

/// At most one like per user per post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Like {
    pub user: Uuid,
}

/// Comment sub-document. New comments go to the head of the sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub date: DateTime<Utc>,
}

impl Comment {
    pub fn new(user: Uuid, text: String, name: String, avatar: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            text,
            name,
            avatar,
            date: Utc::now(),
        }
    }
}
