use crate::helpers::TestApp;

#[tokio::test]
async fn is_present() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let res = app.health_check().await.expect("Failed to execute request");

    assert!(res.status().is_success());
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = TestApp::spawn(&TestApp::lazy_pool()).await;

    let res = app
        .request(reqwest::Method::GET, "api/v1/nothing-here")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(404, res.status().as_u16());
}
