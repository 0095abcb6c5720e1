//! Multi-step user journeys across several endpoints.

mod common;

use axum::http::StatusCode;
use rstest::rstest;

use common::{body_text, create_test_app};

#[rstest]
#[tokio::test]
async fn test_anonymous_user_starts_and_extends_a_list() {
    let app = create_test_app();

    let edith_list = app.create_list("Buy peacock feathers", None).await;
    app.add_item(&edith_list, "Use peacock feathers to make a fly")
        .await;

    let html = app.page(&edith_list, None).await;
    assert!(html.contains("1: Buy peacock feathers"));
    assert!(html.contains("2: Use peacock feathers to make a fly"));

    let francis_list = app.create_list("Buy milk", None).await;
    assert_ne!(francis_list, edith_list);

    let html = app.page(&francis_list, None).await;
    assert!(html.contains("1: Buy milk"));
    assert!(!html.contains("peacock feathers"));
}

#[rstest]
#[tokio::test]
async fn test_owner_shares_list_with_another_user() {
    let app = create_test_app();
    let edith = app.log_in("edith@example.com").await;
    let oni = app.log_in("oniciferous@example.com").await;

    let url = app.create_list("Get help", Some(&edith)).await;
    app.post_form(
        &format!("{url}share"),
        "sharee=oniciferous%40example.com",
        Some(&edith),
    )
    .await;

    let html = app.page(&url, Some(&edith)).await;
    assert!(html.contains(r#"<span id="id_list_owner">edith@example.com</span>"#));
    assert!(html.contains("oniciferous@example.com"));

    let html = app
        .page("/lists/users/oniciferous@example.com/", Some(&oni))
        .await;
    assert!(html.contains("Get help"));

    app.add_item(&url, "Hi Edith").await;
    let html = app.page(&url, Some(&edith)).await;
    assert!(html.contains("2: Hi Edith"));
}

#[rstest]
#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[rstest]
#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = create_test_app();

    let response = app.get("/nowhere", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
