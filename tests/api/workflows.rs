use chrono::{DateTime, Duration, Utc};

use reqwest::{Method, StatusCode};

use sqlx::PgPool;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{subscription_body, TestApp, TestUser};

fn invocation(subscription_id: &str, steps: &[serde_json::Value]) -> serde_json::Value {
    serde_json::json!({
        "workflowRunId": "wfr_test",
        "payload": {"subscriptionId": subscription_id},
        "steps": steps,
    })
}

/// Play the workflow service: call back until the run finishes, recording
/// each step and waking sleeps by moving the app clock
async fn drive(app: &TestApp, subscription_id: &str) -> Vec<serde_json::Value> {
    let mut steps = Vec::new();
    for _ in 0..32 {
        let res = app
            .workflow_callback(&invocation(subscription_id, &steps), true)
            .await
            .expect("Failed to execute request");
        assert_eq!(StatusCode::OK, res.status());

        let outcome: serde_json::Value = res.json().await.unwrap();
        match outcome["status"].as_str() {
            Some("step") => steps.push(serde_json::json!({
                "type": "run",
                "label": outcome["label"],
                "output": outcome["output"],
            })),
            Some("sleep") => {
                let wake_at: DateTime<Utc> =
                    serde_json::from_value(outcome["wakeAt"].clone()).unwrap();
                app.clock.set(wake_at);
                steps.push(serde_json::json!({
                    "type": "sleep",
                    "label": outcome["label"],
                    "wakeAt": outcome["wakeAt"],
                }));
            }
            Some("finished") => return steps,
            other => panic!("Unexpected workflow outcome {:?}", other),
        }
    }
    panic!("Workflow did not finish");
}

#[tokio::test]
async fn unsigned_callbacks_are_rejected() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let res = app
        .workflow_callback(&invocation("abc", &[]), false)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
}

#[tokio::test]
async fn callbacks_with_a_forged_signature_are_rejected() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let res = app
        .request(Method::POST, "api/v1/workflows/subscriptions/reminder")
        .header("Workflow-Signature", "Zm9yZ2Vk")
        .json(&invocation("abc", &[]))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
}

#[tokio::test]
async fn malformed_invocations_are_bad_requests() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let res = app
        .workflow_callback(&serde_json::json!({"payload": 42}), true)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
}

#[tokio::test]
async fn unknown_subscription_ids_finish_quietly() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let steps = drive(&app, "not-a-subscription-id").await;

    assert_eq!(1, steps.len());
    assert_eq!("get subscription", steps[0]["label"]);
    assert!(steps[0]["output"].is_null());
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn reminders_are_sent_once_for_each_lead_time(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.accept_workflow_triggers().await;
    let user = TestUser::register(&app, "owner@test.com").await;

    let mut body = subscription_body();
    body["renewalDate"] = serde_json::json!((Utc::now() + Duration::days(10)).to_rfc3339());
    let res = app
        .subscription_create(Some(&user.token), &body)
        .await
        .expect("Failed to execute request");
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["data"]["subscription"]["id"].as_str().unwrap().to_string();

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&app.email_server)
        .await;

    let steps = drive(&app, &id).await;

    let labels: Vec<_> = steps
        .iter()
        .map(|s| s["label"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        vec![
            "get subscription",
            "Reminder 7 days",
            "7 days before reminder",
            "Reminder 5 days",
            "5 days before reminder",
            "Reminder 2 days",
            "2 days before reminder",
            "Reminder 1 days",
            "1 days before reminder",
        ],
        labels
    );

    let emails = app.email_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&emails[0].body).unwrap();
    assert_eq!("owner@test.com", body["To"]);
    assert!(body["Subject"].as_str().unwrap().contains("Netflix Premium"));
    assert_eq!("renewal-reminder", body["Tag"]);

    Ok(())
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn cancelled_subscriptions_get_no_reminders(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    app.accept_workflow_triggers().await;
    let user = TestUser::register(&app, "owner@test.com").await;

    let res = app
        .subscription_create(Some(&user.token), &subscription_body())
        .await
        .expect("Failed to execute request");
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["data"]["subscription"]["id"].as_str().unwrap().to_string();

    app.authorized_request(
        Method::PUT,
        &format!("api/v1/subscriptions/{}/cancel", id),
        Some(&user.token),
    )
    .send()
    .await
    .expect("Failed to execute request");

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let steps = drive(&app, &id).await;

    assert_eq!(1, steps.len());
    assert_eq!("cancelled", steps[0]["output"]["status"]);
    Ok(())
}
