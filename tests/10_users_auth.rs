mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_returns_token_usable_against_protected_routes() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::post(
        &app.router,
        "/api/users",
        None,
        json!({ "name": "Dev One", "email": "dev@example.com", "password": "hunter2!" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("token").to_string();

    let (status, body) = common::get(&app.router, "/api/auth", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Dev One");
    assert_eq!(body["email"], "dev@example.com");
    // Hash must never leak
    assert!(body.get("password").is_none());
    assert!(body["avatar"].as_str().unwrap().starts_with("https://www.gravatar.com/avatar/"));

    Ok(())
}

#[tokio::test]
async fn register_validates_all_fields_at_once() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::post(&app.router, "/api/users", None, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let errors = body["errors"].as_array().expect("errors list");
    let params: Vec<_> = errors.iter().map(|e| e["param"].as_str().unwrap()).collect();
    assert_eq!(params, vec!["name", "email", "password"]);

    Ok(())
}

#[tokio::test]
async fn duplicate_email_is_rejected() -> Result<()> {
    let app = common::test_app();
    let payload = json!({ "name": "Dev", "email": "dev@example.com", "password": "hunter2!" });

    let (status, _) = common::post(&app.router, "/api/users", None, payload.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::post(&app.router, "/api/users", None, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["msg"], "User already exists");

    Ok(())
}

#[tokio::test]
async fn login_verifies_credentials() -> Result<()> {
    let app = common::test_app();
    common::post(
        &app.router,
        "/api/users",
        None,
        json!({ "name": "Dev", "email": "dev@example.com", "password": "hunter2!" }),
    )
    .await;

    let (status, body) = common::post(
        &app.router,
        "/api/auth",
        None,
        json!({ "email": "dev@example.com", "password": "hunter2!" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    // Wrong password and unknown email collapse to the same response
    let (status, body) = common::post(
        &app.router,
        "/api/auth",
        None,
        json!({ "email": "dev@example.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["msg"], "Invalid Credentials");

    let (status, body) = common::post(
        &app.router,
        "/api/auth",
        None,
        json!({ "email": "nobody@example.com", "password": "hunter2!" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["msg"], "Invalid Credentials");

    Ok(())
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() -> Result<()> {
    let app = common::test_app();

    let (status, body) = common::get(&app.router, "/api/auth", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "No token, authorization denied");

    let (status, body) = common::get(&app.router, "/api/auth", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["msg"], "Token is not valid");

    Ok(())
}
