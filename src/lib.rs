use std::sync::Arc;

use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod github;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;
pub mod validation;

use crate::github::GithubClient;
use crate::middleware::jwt_auth_middleware;
use crate::store::Store;

/// Shared application state: the store behind its trait so tests can swap in
/// the in-memory implementation, plus the external lookup client.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub github: GithubClient,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(users_routes())
        .merge(auth_routes())
        .merge(github_routes())
        // Protected
        .merge(profile_routes())
        .merge(posts_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn users_routes() -> Router<AppState> {
    use handlers::public::users;

    Router::new().route("/api/users", post(users::register))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth", post(handlers::public::auth::login))
        .merge(
            Router::new()
                .route("/api/auth", get(handlers::protected::auth::current_user))
                .route_layer(from_fn(jwt_auth_middleware)),
        )
}

fn github_routes() -> Router<AppState> {
    use handlers::public::github;

    Router::new().route("/api/profile/github/:username", get(github::repos))
}

fn profile_routes() -> Router<AppState> {
    use handlers::protected::profile;

    Router::new()
        .route("/api/profile/me", get(profile::me))
        .route(
            "/api/profile",
            post(profile::upsert).get(profile::list).delete(profile::remove),
        )
        .route("/api/profile/user/:user_id", get(profile::by_user))
        .route("/api/profile/experience", put(profile::experience_add))
        .route("/api/profile/experience/:exp_id", delete(profile::experience_delete))
        .route("/api/profile/education", put(profile::education_add))
        .route("/api/profile/education/:edu_id", delete(profile::education_delete))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn posts_routes() -> Router<AppState> {
    use handlers::protected::posts;

    Router::new()
        .route("/api/posts", post(posts::create).get(posts::list))
        .route("/api/posts/:id", get(posts::get).delete(posts::remove))
        .route("/api/posts/like/:id", put(posts::like))
        .route("/api/posts/unlike/:id", put(posts::unlike))
        .route("/api/posts/comment/:id", post(posts::comment_add))
        .route("/api/posts/comment/:id/:comment_id", delete(posts::comment_remove))
        .route_layer(from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "DevConnector API",
        "version": version,
        "endpoints": {
            "users": "/api/users (public - registration)",
            "auth": "/api/auth (public login, protected whoami)",
            "profile": "/api/profile[/me, /user/:user_id, /experience, /education] (protected)",
            "github": "/api/profile/github/:username (public)",
            "posts": "/api/posts[/:id, /like/:id, /comment/:id] (protected)",
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health().await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
