use chrono::{Duration, Utc};

use reqwest::{Method, StatusCode};

use sqlx::PgPool;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{subscription_body, TestApp, TestUser};

#[tokio::test]
async fn creating_requires_a_token() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let res = app
        .subscription_create(None, &subscription_body())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn create_persists_and_triggers_the_reminder_workflow(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user = TestUser::register(&app, "test@test.com").await;

    Mock::given(method("POST"))
        .and(path_regex("^/v2/trigger/http.*/api/v1/workflows/subscriptions/reminder$"))
        .and(header("Workflow-Retries", "0"))
        .and(header("Authorization", "Bearer TestWorkflowToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"workflowRunId": "wfr_1"})),
        )
        .expect(1)
        .mount(&app.workflow_server)
        .await;

    let res = app
        .subscription_create(Some(&user.token), &subscription_body())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CREATED, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!("wfr_1", body["data"]["workflowRunId"]);
    assert_eq!("active", body["data"]["subscription"]["status"]);

    let trigger = &app.workflow_server.received_requests().await.unwrap()[0];
    let payload: serde_json::Value = serde_json::from_slice(&trigger.body).unwrap();
    assert_eq!(
        body["data"]["subscription"]["id"],
        payload["subscriptionId"]
    );

    let (user_id,): (uuid::Uuid,) = sqlx::query_as("select user_id from subscriptions")
        .fetch_one(&pool)
        .await?;
    assert_eq!(user.id, user_id);

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn renewal_is_derived_from_frequency(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user = TestUser::register(&app, "test@test.com").await;
    app.accept_workflow_triggers().await;

    let start = Utc::now() - Duration::days(2);
    let mut body = subscription_body();
    body["startDate"] = serde_json::json!(start.to_rfc3339());

    let res = app
        .subscription_create(Some(&user.token), &body)
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let (start_date, renewal_date): (chrono::DateTime<Utc>, chrono::DateTime<Utc>) =
        sqlx::query_as("select start_date, renewal_date from subscriptions")
            .fetch_one(&pool)
            .await?;
    assert_eq!(Duration::days(30), renewal_date - start_date);

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn create_is_consistent_if_the_trigger_fails(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user = TestUser::register(&app, "test@test.com").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.workflow_server)
        .await;

    let res = app
        .subscription_create(Some(&user.token), &subscription_body())
        .await
        .expect("Failed to execute request");

    assert!(res.status().is_server_error());

    let subscription: Option<(uuid::Uuid,)> = sqlx::query_as("select id from subscriptions")
        .fetch_optional(&pool)
        .await?;
    assert!(subscription.is_none());

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn invalid_subscriptions_are_bad_requests(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let user = TestUser::register(&app, "test@test.com").await;

    let mut future_start = subscription_body();
    future_start["startDate"] = serde_json::json!((Utc::now() + Duration::days(3)).to_rfc3339());

    let mut renewal_before_start = subscription_body();
    renewal_before_start["renewalDate"] =
        serde_json::json!((Utc::now() - Duration::days(5)).to_rfc3339());

    let mut no_schedule = subscription_body();
    no_schedule.as_object_mut().unwrap().remove("frequency");

    for (desc, body) in [
        ("start date in the future", future_start),
        ("renewal before start", renewal_before_start),
        ("no frequency or renewal date", no_schedule),
    ] {
        let res = app
            .subscription_create(Some(&user.token), &body)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "API did not fail for {}",
            desc
        );
    }
    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn only_the_owner_can_list_their_subscriptions(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.accept_workflow_triggers().await;
    let owner = TestUser::register(&app, "owner@test.com").await;
    let stranger = TestUser::register(&app, "stranger@test.com").await;

    app.subscription_create(Some(&owner.token), &subscription_body())
        .await
        .expect("Failed to execute request");

    let url = format!("api/v1/subscriptions/user/{}", owner.id);

    let res = app
        .authorized_request(Method::GET, &url, Some(&owner.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(1, body["totalSubscriptions"]);
    assert_eq!(1, body["data"].as_array().unwrap().len());

    let res = app
        .authorized_request(Method::GET, &url, Some(&stranger.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn owner_can_fetch_cancel_and_delete(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.accept_workflow_triggers().await;
    let owner = TestUser::register(&app, "owner@test.com").await;
    let stranger = TestUser::register(&app, "stranger@test.com").await;

    let res = app
        .subscription_create(Some(&owner.token), &subscription_body())
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = res.json().await.unwrap();
    let id = body["data"]["subscription"]["id"].as_str().unwrap().to_string();
    let url = format!("api/v1/subscriptions/{}", id);

    let res = app
        .authorized_request(Method::GET, &url, Some(&stranger.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    let res = app
        .authorized_request(Method::GET, &url, Some(&owner.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let cancel_url = format!("{}/cancel", url);
    for _ in 0..2 {
        let res = app
            .authorized_request(Method::PUT, &cancel_url, Some(&owner.token))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::OK, res.status());
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!("cancelled", body["data"]["status"]);
    }

    let res = app
        .authorized_request(Method::DELETE, &url, Some(&stranger.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    let res = app
        .authorized_request(Method::DELETE, &url, Some(&owner.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let res = app
        .authorized_request(Method::GET, &url, Some(&owner.token))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn upcoming_lists_renewals_within_a_week(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.accept_workflow_triggers().await;
    let owner = TestUser::register(&app, "owner@test.com").await;

    for renew_in in [3, 20] {
        let mut body = subscription_body();
        body["renewalDate"] = serde_json::json!((Utc::now() + Duration::days(renew_in)).to_rfc3339());
        app.subscription_create(Some(&owner.token), &body)
            .await
            .expect("Failed to execute request");
    }

    let res = app
        .authorized_request(Method::GET, "api/v1/subscriptions/upcoming", Some(&owner.token))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(1, body["data"].as_array().unwrap().len());

    Ok(())
}
