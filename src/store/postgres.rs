// Postgres-backed store.
//
// Profile sub-document sequences and post likes/comments live in JSONB
// columns; every read-modify-write takes a row lock (SELECT ... FOR UPDATE)
// inside a transaction, which serializes concurrent mutations per user. The
// cascade delete runs all three deletes in one transaction.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{Comment, Education, Experience, Like, Post, Profile, Social, User};
use crate::store::{OwnerRef, ProfileUpdate, ProfileWithOwner, Store, StoreError};

pub struct PgStore {
    pool: PgPool,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        avatar TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS profiles (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL UNIQUE REFERENCES users(id),
        company TEXT,
        location TEXT,
        website TEXT,
        bio TEXT,
        status TEXT NOT NULL,
        githubusername TEXT,
        skills TEXT[] NOT NULL DEFAULT '{}',
        social JSONB NOT NULL DEFAULT '{}',
        experience JSONB NOT NULL DEFAULT '[]',
        education JSONB NOT NULL DEFAULT '[]',
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        text TEXT NOT NULL,
        name TEXT NOT NULL,
        avatar TEXT,
        likes JSONB NOT NULL DEFAULT '[]',
        comments JSONB NOT NULL DEFAULT '[]',
        date TIMESTAMPTZ NOT NULL
    )",
];

impl PgStore {
    /// Open the pool from DATABASE_URL and make sure the tables exist.
    /// Called once at process start; `close` releases the pool at shutdown.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = std::env::var("DATABASE_URL")
            .map_err(|_| StoreError::Connection("DATABASE_URL is not set".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&url)
            .await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("connected to Postgres, schema ensured");
        Ok(Self { pool })
    }

    /// Lock the caller's profile row, apply `mutate`, persist the
    /// sub-document columns. Returns None when the user has no profile.
    async fn mutate_profile<F>(
        &self,
        user_id: Uuid,
        mutate: F,
    ) -> Result<Option<Profile>, StoreError>
    where
        F: FnOnce(&mut Profile) + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut profile = Profile::from(row);
        mutate(&mut profile);

        sqlx::query(
            "UPDATE profiles SET experience = $2, education = $3, updated_at = $4 WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(Json(&profile.experience))
        .bind(Json(&profile.education))
        .bind(profile.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(profile))
    }

    /// Same locking discipline for post like/comment sequences.
    async fn mutate_post<F>(&self, post_id: Uuid, mutate: F) -> Result<Option<Post>, StoreError>
    where
        F: FnOnce(&mut Post) + Send,
    {
        let mut tx = self.pool.begin().await?;

        let row =
            sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = $1 FOR UPDATE")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut post = Post::from(row);
        mutate(&mut post);

        sqlx::query("UPDATE posts SET likes = $2, comments = $3 WHERE id = $1")
            .bind(post_id)
            .bind(Json(&post.likes))
            .bind(Json(&post.comments))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(post))
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    company: Option<String>,
    location: Option<String>,
    website: Option<String>,
    bio: Option<String>,
    status: String,
    githubusername: Option<String>,
    skills: Vec<String>,
    social: Json<Social>,
    experience: Json<Vec<Experience>>,
    education: Json<Vec<Education>>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            user: row.user_id,
            company: row.company,
            location: row.location,
            website: row.website,
            bio: row.bio,
            status: row.status,
            githubusername: row.githubusername,
            skills: row.skills,
            social: row.social.0,
            experience: row.experience.0,
            education: row.education.0,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProfileOwnerRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    owner_name: String,
    owner_avatar: Option<String>,
}

impl From<ProfileOwnerRow> for ProfileWithOwner {
    fn from(row: ProfileOwnerRow) -> Self {
        let owner = OwnerRef {
            id: row.profile.user_id,
            name: row.owner_name,
            avatar: row.owner_avatar,
        };
        ProfileWithOwner {
            profile: Profile::from(row.profile),
            owner,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    text: String,
    name: String,
    avatar: Option<String>,
    likes: Json<Vec<Like>>,
    comments: Json<Vec<Comment>>,
    date: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            user: row.user_id,
            text: row.text,
            name: row.name,
            avatar: row.avatar,
            likes: row.likes.0,
            comments: row.comments.0,
            date: row.date,
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("closed Postgres pool");
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password, avatar, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.avatar)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate("user"),
            other => StoreError::Sqlx(other),
        })?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_profile_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Profile::from))
    }

    async fn find_profile_expanded(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProfileWithOwner>, StoreError> {
        let row = sqlx::query_as::<_, ProfileOwnerRow>(
            "SELECT p.*, u.name AS owner_name, u.avatar AS owner_avatar
             FROM profiles p JOIN users u ON u.id = p.user_id
             WHERE p.user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ProfileWithOwner::from))
    }

    async fn list_profiles_expanded(&self) -> Result<Vec<ProfileWithOwner>, StoreError> {
        let rows = sqlx::query_as::<_, ProfileOwnerRow>(
            "SELECT p.*, u.name AS owner_name, u.avatar AS owner_avatar
             FROM profiles p JOIN users u ON u.id = p.user_id
             ORDER BY p.updated_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProfileWithOwner::from).collect())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Profile, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM profiles WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let profile = match existing {
            Some(row) => {
                let mut profile = Profile::from(row);
                update.apply_to(&mut profile);
                sqlx::query(
                    "UPDATE profiles
                     SET company = $2, location = $3, website = $4, bio = $5, status = $6,
                         githubusername = $7, skills = $8, social = $9, updated_at = $10
                     WHERE user_id = $1",
                )
                .bind(user_id)
                .bind(&profile.company)
                .bind(&profile.location)
                .bind(&profile.website)
                .bind(&profile.bio)
                .bind(&profile.status)
                .bind(&profile.githubusername)
                .bind(&profile.skills)
                .bind(Json(&profile.social))
                .bind(profile.updated_at)
                .execute(&mut *tx)
                .await?;
                profile
            }
            None => {
                let profile = update.into_new_profile(user_id);
                sqlx::query(
                    "INSERT INTO profiles
                     (id, user_id, company, location, website, bio, status, githubusername,
                      skills, social, experience, education, updated_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
                )
                .bind(profile.id)
                .bind(profile.user)
                .bind(&profile.company)
                .bind(&profile.location)
                .bind(&profile.website)
                .bind(&profile.bio)
                .bind(&profile.status)
                .bind(&profile.githubusername)
                .bind(&profile.skills)
                .bind(Json(&profile.social))
                .bind(Json(&profile.experience))
                .bind(Json(&profile.education))
                .bind(profile.updated_at)
                .execute(&mut *tx)
                .await?;
                profile
            }
        };

        tx.commit().await?;
        Ok(profile)
    }

    async fn add_experience(
        &self,
        user_id: Uuid,
        entry: Experience,
    ) -> Result<Option<Profile>, StoreError> {
        self.mutate_profile(user_id, |profile| {
            profile.experience.insert(0, entry);
            profile.updated_at = Utc::now();
        })
        .await
    }

    async fn remove_experience(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<Profile>, StoreError> {
        self.mutate_profile(user_id, |profile| {
            profile.experience.retain(|e| e.id != entry_id);
        })
        .await
    }

    async fn add_education(
        &self,
        user_id: Uuid,
        entry: Education,
    ) -> Result<Option<Profile>, StoreError> {
        self.mutate_profile(user_id, |profile| {
            profile.education.insert(0, entry);
            profile.updated_at = Utc::now();
        })
        .await
    }

    async fn remove_education(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
    ) -> Result<Option<Profile>, StoreError> {
        self.mutate_profile(user_id, |profile| {
            profile.education.retain(|e| e.id != entry_id);
        })
        .await
    }

    async fn delete_user_cascade(&self, user_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM posts WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn create_post(&self, post: Post) -> Result<Post, StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, user_id, text, name, avatar, likes, comments, date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(post.id)
        .bind(post.user)
        .bind(&post.text)
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(Json(&post.likes))
        .bind(Json(&post.comments))
        .bind(post.date)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>("SELECT * FROM posts ORDER BY date DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Post::from))
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_like(&self, post_id: Uuid, like: Like) -> Result<Option<Post>, StoreError> {
        self.mutate_post(post_id, |post| {
            post.likes.insert(0, like);
        })
        .await
    }

    async fn remove_like(
        &self,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Post>, StoreError> {
        self.mutate_post(post_id, |post| {
            post.likes.retain(|l| l.user != user_id);
        })
        .await
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        comment: Comment,
    ) -> Result<Option<Post>, StoreError> {
        self.mutate_post(post_id, |post| {
            post.comments.insert(0, comment);
        })
        .await
    }

    async fn remove_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Post>, StoreError> {
        self.mutate_post(post_id, |post| {
            post.comments.retain(|c| c.id != comment_id);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_row_maps_to_aggregate() {
        let user_id = Uuid::new_v4();
        let row = ProfileRow {
            id: Uuid::new_v4(),
            user_id,
            company: Some("Acme".to_string()),
            location: None,
            website: None,
            bio: None,
            status: "Developer".to_string(),
            githubusername: None,
            skills: vec!["Rust".to_string()],
            social: Json(Social::default()),
            experience: Json(Vec::new()),
            education: Json(Vec::new()),
            updated_at: Utc::now(),
        };

        let profile = Profile::from(row);
        assert_eq!(profile.user, user_id);
        assert_eq!(profile.company.as_deref(), Some("Acme"));
        assert_eq!(profile.skills, vec!["Rust"]);
    }
}
