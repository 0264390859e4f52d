#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use devconnector_api::auth::{generate_jwt, Claims};
use devconnector_api::config::GithubConfig;
use devconnector_api::github::GithubClient;
use devconnector_api::models::User;
use devconnector_api::store::{MemoryStore, Store};
use devconnector_api::{app, AppState};

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// Router over a fresh in-memory store. The github client points at a
/// reserved port; only the github tests stand up a stub for it.
pub fn test_app() -> TestApp {
    test_app_with_github("http://127.0.0.1:9")
}

pub fn test_app_with_github(api_base: &str) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let store_dyn: Arc<dyn Store> = store.clone();
    let github = GithubClient::new(&GithubConfig {
        api_base: api_base.to_string(),
        client_id: "test-client-id".to_string(),
        client_secret: "test-client-secret".to_string(),
    });

    TestApp {
        router: app(AppState { store: store_dyn, github }),
        store,
    }
}

/// Insert a user directly and mint a token for it, skipping the register
/// endpoint for tests that aren't about registration.
pub async fn seed_user(app: &TestApp, name: &str, email: &str) -> (Uuid, String) {
    let user = app
        .store
        .create_user(User::new(
            name.to_string(),
            email.to_string(),
            "not-a-real-hash".to_string(),
            None,
        ))
        .await
        .expect("seed user");

    let token = generate_jwt(Claims::new(user.id)).expect("seed token");
    (user.id, token)
}

/// Drive one request through the router and decode the JSON body.
pub async fn request(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };

    (status, value)
}

pub async fn get(router: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    request(router, "GET", path, token, None).await
}

pub async fn post(
    router: &Router,
    path: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    request(router, "POST", path, token, Some(body)).await
}

pub async fn put(
    router: &Router,
    path: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    request(router, "PUT", path, token, Some(body)).await
}

pub async fn delete(router: &Router, path: &str, token: Option<&str>) -> (StatusCode, Value) {
    request(router, "DELETE", path, token, None).await
}
