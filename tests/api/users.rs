use reqwest::{Method, StatusCode};

use sqlx::PgPool;

use uuid::Uuid;

use crate::helpers::{TestApp, TestUser};

#[tokio::test]
async fn users_require_a_token() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    for token in [None, Some("garbage"), Some("e30.c2ln")] {
        let res = app
            .authorized_request(Method::GET, "api/v1/users", token)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::UNAUTHORIZED,
            res.status(),
            "Token {:?} was accepted",
            token
        );
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(false, body["success"]);
    }
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn users_can_be_listed_and_fetched(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let first = TestUser::register(&app, "first@test.com").await;
    TestUser::register(&app, "second@test.com").await;

    let res = app
        .authorized_request(Method::GET, "api/v1/users", Some(&first.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(2, body["data"].as_array().unwrap().len());

    let res = app
        .authorized_request(
            Method::GET,
            &format!("api/v1/users/{}", first.id),
            Some(&first.token),
        )
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!("first@test.com", body["data"]["email"]);

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn missing_users_are_not_found(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user = TestUser::register(&app, "test@test.com").await;

    for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let res = app
            .authorized_request(Method::GET, &format!("api/v1/users/{}", id), Some(&user.token))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }
    Ok(())
}
