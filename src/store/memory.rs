// In-memory store used by the test suite and local experimentation.
//
// A single RwLock guards all three collections; every mutation holds the
// write lock for its whole read-modify-write, which is the per-user
// serialization point the profile sub-document operations require.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Comment, Education, Experience, Like, Post, Profile, User};
use crate::store::{OwnerRef, ProfileUpdate, ProfileWithOwner, Store, StoreError};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    // keyed by owning user id: at most one profile per user
    profiles: HashMap<Uuid, Profile>,
    posts: HashMap<Uuid, Post>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn expand(profile: &Profile, users: &HashMap<Uuid, User>) -> Option<ProfileWithOwner> {
        let owner = users.get(&profile.user)?;
        Some(ProfileWithOwner {
            profile: profile.clone(),
            owner: OwnerRef {
                id: owner.id,
                name: owner.name.clone(),
                avatar: owner.avatar.clone(),
            },
        })
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn close(&self) {}

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("user"));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.get(&user_id).cloned())
    }

    async fn find_profile_expanded(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProfileWithOwner>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .profiles
            .get(&user_id)
            .and_then(|p| Self::expand(p, &inner.users)))
    }

    async fn list_profiles_expanded(&self) -> Result<Vec<ProfileWithOwner>, StoreError> {
        let inner = self.inner.read().await;
        let mut profiles: Vec<_> = inner
            .profiles
            .values()
            .filter_map(|p| Self::expand(p, &inner.users))
            .collect();
        profiles.sort_by_key(|p| p.profile.updated_at);
        Ok(profiles)
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        let mut inner = self.inner.write().await;
        let profile = match inner.profiles.get_mut(&user_id) {
            Some(existing) => {
                update.apply_to(existing);
                existing.clone()
            }
            None => {
                let created = update.into_new_profile(user_id);
                inner.profiles.insert(user_id, created.clone());
                created
            }
        };
        Ok(profile)
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: Experience,
    ) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.profiles.get_mut(&user_id).map(|profile| {
            profile.experience.insert(0, entry);
            profile.updated_at = chrono::Utc::now();
            profile.clone()
        }))
    }

    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.profiles.get_mut(&user_id).map(|profile| {
            profile.experience.retain(|e| e.id != entry_id);
            profile.clone()
        }))
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: Education,
    ) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.profiles.get_mut(&user_id).map(|profile| {
            profile.education.insert(0, entry);
            profile.updated_at = chrono::Utc::now();
            profile.clone()
        }))
    }

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.profiles.get_mut(&user_id).map(|profile| {
            profile.education.retain(|e| e.id != entry_id);
            profile.clone()
        }))
    }

    async fn delete_user_cascade(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.posts.retain(|_, post| post.user != user_id);
        inner.profiles.remove(&user_id);
        inner.users.remove(&user_id);
        Ok(())
    }

    async fn create_post(&self, post: Post) -> Result<Post, StoreError> {
        let mut inner = self.inner.write().await;
        inner.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let inner = self.inner.read().await;
        let mut posts: Vec<_> = inner.posts.values().cloned().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.posts.get(&id).cloned())
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.posts.remove(&id);
        Ok(())
    }

    async fn add_like(&self, post_id: Uuid, like: Like) -> Result<Option<Post>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.posts.get_mut(&post_id).map(|post| {
            post.likes.insert(0, like);
            post.clone()
        }))
    }

    async fn remove_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Post>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.posts.get_mut(&post_id).map(|post| {
            post.likes.retain(|like| like.user != user_id);
            post.clone()
        }))
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        comment: Comment,
    ) -> Result<Option<Post>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.posts.get_mut(&post_id).map(|post| {
            post.comments.insert(0, comment);
            post.clone()
        }))
    }

    async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Post>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.posts.get_mut(&post_id).map(|post| {
            post.comments.retain(|c| c.id != comment_id);
            post.clone()
        }))
    }
}
