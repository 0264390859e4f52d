mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

async fn seed_profile(app: &common::TestApp, token: &str) {
    let (status, _) = common::post(
        &app.router,
        "/api/profile",
        Some(token),
        json!({ "status": "Developer", "skills": "Rust" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn new_experience_goes_to_the_head() -> Result<()> {
    let app = common::test_app();
    let (_, token) = common::seed_user(&app, "Dev", "dev@example.com").await;
    seed_profile(&app, &token).await;

    common::put(
        &app.router,
        "/api/profile/experience",
        Some(&token),
        json!({ "title": "Junior Dev", "company": "Acme", "from": "2018-01-01" }),
    )
    .await;

    let (status, body) = common::put(
        &app.router,
        "/api/profile/experience",
        Some(&token),
        json!({ "title": "Senior Dev", "company": "Globex", "from": "2021-06-01", "current": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let experience = body["experience"].as_array().expect("experience");
    assert_eq!(experience.len(), 2);
    assert_eq!(experience[0]["title"], "Senior Dev");
    assert_eq!(experience[1]["title"], "Junior Dev");

    Ok(())
}

#[tokio::test]
async fn delete_by_id_preserves_the_rest_in_order() -> Result<()> {
    let app = common::test_app();
    let (_, token) = common::seed_user(&app, "Dev", "dev@example.com").await;
    seed_profile(&app, &token).await;

    for (title, from) in [("first", "2018-01-01"), ("second", "2019-01-01"), ("third", "2020-01-01")] {
        common::put(
            &app.router,
            "/api/profile/experience",
            Some(&token),
            json!({ "title": title, "company": "Acme", "from": from }),
        )
        .await;
    }

    let (_, body) = common::get(&app.router, "/api/profile/me", Some(&token)).await;
    // Head-insert order: third, second, first
    let target = body["experience"][1]["id"].as_str().expect("id").to_string();

    let (status, body) = common::delete(
        &app.router,
        &format!("/api/profile/experience/{}", target),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let experience = body["experience"].as_array().expect("experience");
    assert_eq!(experience.len(), 2);
    assert_eq!(experience[0]["title"], "third");
    assert_eq!(experience[1]["title"], "first");

    Ok(())
}

#[tokio::test]
async fn unknown_or_malformed_entry_id_is_a_noop() -> Result<()> {
    let app = common::test_app();
    let (_, token) = common::seed_user(&app, "Dev", "dev@example.com").await;
    seed_profile(&app, &token).await;

    common::put(
        &app.router,
        "/api/profile/experience",
        Some(&token),
        json!({ "title": "Dev", "company": "Acme", "from": "2020-01-01" }),
    )
    .await;

    let (status, body) = common::delete(
        &app.router,
        &format!("/api/profile/experience/{}", uuid::Uuid::new_v4()),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["experience"].as_array().unwrap().len(), 1);

    let (status, body) = common::delete(
        &app.router,
        "/api/profile/experience/not-a-uuid",
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["experience"].as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn sub_document_routes_404_without_a_profile() -> Result<()> {
    let app = common::test_app();
    let (_, token) = common::seed_user(&app, "Dev", "dev@example.com").await;

    let (status, body) = common::put(
        &app.router,
        "/api/profile/experience",
        Some(&token),
        json!({ "title": "Dev", "company": "Acme", "from": "2020-01-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["msg"], "There is no profile for this user");

    let (status, _) = common::delete(
        &app.router,
        &format!("/api/profile/experience/{}", uuid::Uuid::new_v4()),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn education_mirrors_experience_semantics() -> Result<()> {
    let app = common::test_app();
    let (_, token) = common::seed_user(&app, "Dev", "dev@example.com").await;
    seed_profile(&app, &token).await;

    let (status, body) = common::put(
        &app.router,
        "/api/profile/education",
        Some(&token),
        json!({ "degree": "BSc" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let params: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["param"].as_str().unwrap())
        .collect();
    assert_eq!(params, vec!["school", "fieldofstudy"]);

    common::put(
        &app.router,
        "/api/profile/education",
        Some(&token),
        json!({ "school": "MIT", "degree": "BSc", "fieldofstudy": "CS", "from": "2014-09-01" }),
    )
    .await;
    let (status, body) = common::put(
        &app.router,
        "/api/profile/education",
        Some(&token),
        json!({ "school": "CMU", "degree": "MSc", "fieldofstudy": "CS", "from": "2018-09-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let education = body["education"].as_array().expect("education");
    assert_eq!(education.len(), 2);
    assert_eq!(education[0]["school"], "CMU");

    let target = education[0]["id"].as_str().unwrap().to_string();
    let (status, body) = common::delete(
        &app.router,
        &format!("/api/profile/education/{}", target),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["education"].as_array().unwrap().len(), 1);
    assert_eq!(body["education"][0]["school"], "MIT");

    Ok(())
}

#[tokio::test]
async fn concurrent_experience_adds_both_survive() -> Result<()> {
    let app = common::test_app();
    let (_, token) = common::seed_user(&app, "Dev", "dev@example.com").await;
    seed_profile(&app, &token).await;

    let first = common::put(
        &app.router,
        "/api/profile/experience",
        Some(&token),
        json!({ "title": "A", "company": "Acme", "from": "2020-01-01" }),
    );
    let second = common::put(
        &app.router,
        "/api/profile/experience",
        Some(&token),
        json!({ "title": "B", "company": "Acme", "from": "2021-01-01" }),
    );

    let ((s1, _), (s2, _)) = tokio::join!(first, second);
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);

    let (_, body) = common::get(&app.router, "/api/profile/me", Some(&token)).await;
    assert_eq!(body["experience"].as_array().unwrap().len(), 2);

    Ok(())
}
