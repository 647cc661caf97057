//! Signup, login, logout and account deletion over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use suds_integration_tests::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new();

    let live = app.get("/health").await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body, "ok");

    let ready = app.get("/health/ready").await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email_case_insensitively() {
    let mut app = TestApp::new();
    app.signup_and_login("ada@example.com").await;

    let mut other = app.new_client();
    let response = other
        .post(
            "/auth/signup",
            &[
                ("first_name", "Ada"),
                ("last_name", "Again"),
                ("email", "ADA@example.com"),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_validation_names_the_field() {
    let mut app = TestApp::new();

    let response = app
        .post(
            "/auth/signup",
            &[
                ("first_name", "A"),
                ("last_name", "Lovelace"),
                ("email", "ada@example.com"),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "first_name");

    let response = app
        .post(
            "/auth/signup",
            &[
                ("first_name", "Ada"),
                ("last_name", "Lovelace"),
                ("email", "ada@example.com"),
                ("password", PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "confirm_password");
    assert_eq!(response.body["error"], "is required");
}

#[tokio::test]
async fn test_login_failures_are_uniform() {
    let mut app = TestApp::new();
    app.signup_and_login("ada@example.com").await;

    let mut other = app.new_client();
    let wrong_password = other
        .post("/auth/login", &[("email", "ada@example.com"), ("password", "nope nope")])
        .await;
    let unknown = other
        .post("/auth/login", &[("email", "nobody@example.com"), ("password", PASSWORD)])
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown.body);
    assert!(!other.has_session());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut app = TestApp::new();
    app.signup_and_login("ada@example.com").await;
    assert_eq!(app.get("/cart").await.status, StatusCode::OK);

    let response = app.post("/auth/logout", &[]).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/cart").await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_altered_session_cookie_is_no_session() {
    let mut app = TestApp::new();
    app.signup_and_login("ada@example.com").await;
    let signed = app.session_cookie().unwrap().to_string();
    let (name, value) = signed.split_once('=').unwrap();

    // The value is a 44-character signature followed by the session ID.
    assert!(value.len() > 44);
    let (_, session_id) = value.split_at(44);

    app.set_session_cookie(Some(format!("{name}={session_id}")));
    assert_eq!(app.get("/cart").await.status, StatusCode::UNAUTHORIZED);

    let mut flipped = value.to_string();
    let last = if flipped.ends_with('A') { "B" } else { "A" };
    flipped.replace_range(flipped.len() - 1.., last);
    app.set_session_cookie(Some(format!("{name}={flipped}")));
    assert_eq!(app.get("/cart").await.status, StatusCode::UNAUTHORIZED);

    app.set_session_cookie(Some(signed));
    assert_eq!(app.get("/cart").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_account_keeps_orders_and_blocks_login() {
    let mut app = TestApp::new();
    app.seed_product(1, "Oat Bar", 400, "Bar").await;
    let shopper = app.signup_and_login("ada@example.com").await;

    app.post("/cart/add", &[("product_id", "1")]).await;
    let cart_id = app.get("/cart").await.body["cart_id"].as_i64().unwrap();
    app.post(&format!("/orders/{cart_id}/complete"), &[]).await;
    app.post("/cart/add", &[("product_id", "1")]).await;

    let response = app.delete("/account").await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(app.get("/cart").await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.open_cart_count(shopper).await, 0);

    let login = app
        .post("/auth/login", &[("email", "ada@example.com"), ("password", PASSWORD)])
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}
