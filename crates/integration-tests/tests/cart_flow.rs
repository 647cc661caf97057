//! Cart and order lifecycle over HTTP.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use suds_integration_tests::TestApp;

async fn app_with_catalog() -> TestApp {
    let app = TestApp::new();
    app.seed_product(7, "Lavender Bar", 350, "Bar").await;
    app.seed_product(8, "Citrus Wash", 1_000, "Liquid").await;
    app
}

#[tokio::test]
async fn test_cart_requires_login() {
    let mut app = app_with_catalog().await;

    let response = app.get("/cart").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.post("/cart/add", &[("product_id", "7")]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.get("/orders").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_twice_totals_two_units() {
    let mut app = app_with_catalog().await;
    let shopper = app.signup_and_login("ada@example.com").await;

    app.post("/cart/add", &[("product_id", "7")]).await;
    let response = app.post("/cart/add", &[("product_id", "7")]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["item_count"], 2);
    assert_eq!(response.body["total_price"], "7.00");
    assert_eq!(response.body["items"][0]["quantity"], 2);
    assert_eq!(response.body["items"][0]["unit_price"], "3.50");
    assert_eq!(response.body["items"][0]["line_total"], "7.00");
    assert_eq!(app.open_cart_count(shopper).await, 1);
}

#[tokio::test]
async fn test_decrease_removes_line_at_zero() {
    let mut app = app_with_catalog().await;
    app.signup_and_login("ada@example.com").await;

    app.post("/cart/add", &[("product_id", "8")]).await;
    let response = app.post("/cart/decrease", &[("product_id", "8")]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"], json!([]));
    assert_eq!(response.body["total_price"], "0.00");

    let response = app.post("/cart/decrease", &[("product_id", "8")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut app = app_with_catalog().await;
    app.signup_and_login("ada@example.com").await;

    let response = app.post("/cart/add", &[("product_id", "999")]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let cart = app.get("/cart").await;
    assert_eq!(cart.body["item_count"], 0);
}

#[tokio::test]
async fn test_malformed_input_is_a_field_error() {
    let mut app = app_with_catalog().await;
    app.signup_and_login("ada@example.com").await;

    let response = app.post("/cart/add", &[("product_id", "abc")]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"error": "is invalid", "field": "product_id"})
    );

    let response = app.post("/cart/add", &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({"error": "is required", "field": "product_id"})
    );

    let response = app.post("/cart/decrease", &[("product_id", "")]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "product_id");

    let response = app.get("/orders/abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({"error": "is invalid", "field": "cart_id"}));

    let response = app.post("/orders/abc/complete", &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["field"], "cart_id");

    let cart = app.get("/cart").await;
    assert_eq!(cart.body["item_count"], 0);
}

#[tokio::test]
async fn test_complete_order_then_fresh_cart() {
    let mut app = app_with_catalog().await;
    app.signup_and_login("ada@example.com").await;

    app.post("/cart/add", &[("product_id", "7")]).await;
    app.post("/cart/add", &[("product_id", "8")]).await;
    let cart = app.get("/cart").await;
    let cart_id = cart.body["cart_id"].as_i64().unwrap();

    let order = app.post(&format!("/orders/{cart_id}/complete"), &[]).await;
    assert_eq!(order.status, StatusCode::OK);
    assert_eq!(order.body["status"], "completed");
    assert_eq!(order.body["total_price"], "13.50");
    assert!(order.body["completed_at"].is_string());

    let fresh = app.get("/cart").await;
    assert_ne!(fresh.body["cart_id"].as_i64().unwrap(), cart_id);
    assert_eq!(fresh.body["item_count"], 0);

    let orders = app.get("/orders").await;
    assert_eq!(orders.body.as_array().unwrap().len(), 1);
    assert_eq!(orders.body[0]["cart_id"], cart_id);

    let shown = app.get(&format!("/orders/{cart_id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["item_count"], 2);

    // Completing the same cart again finds no open cart.
    let again = app.post(&format!("/orders/{cart_id}/complete"), &[]).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_completing_empty_cart_conflicts() {
    let mut app = app_with_catalog().await;
    app.signup_and_login("ada@example.com").await;

    let cart = app.get("/cart").await;
    let cart_id = cart.body["cart_id"].as_i64().unwrap();

    let response = app.post(&format!("/orders/{cart_id}/complete"), &[]).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "Cart is empty");

    let cart = app.get("/cart").await;
    assert_eq!(cart.body["cart_id"].as_i64().unwrap(), cart_id);
}

#[tokio::test]
async fn test_orders_are_private_and_uniformly_not_found() {
    let mut ada = app_with_catalog().await;
    ada.signup_and_login("ada@example.com").await;
    ada.post("/cart/add", &[("product_id", "7")]).await;
    let cart_id = ada.get("/cart").await.body["cart_id"].as_i64().unwrap();

    // Still open: not an order yet.
    let open = ada.get(&format!("/orders/{cart_id}")).await;
    assert_eq!(open.status, StatusCode::NOT_FOUND);

    ada.post(&format!("/orders/{cart_id}/complete"), &[]).await;

    let mut grace = ada.new_client();
    grace.signup_and_login("grace@example.com").await;

    let foreign = grace.get(&format!("/orders/{cart_id}")).await;
    let missing = grace.get("/orders/424242").await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body, missing.body);

    let hijack = grace.post(&format!("/orders/{cart_id}/complete"), &[]).await;
    assert_eq!(hijack.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_storage_failure_is_opaque() {
    let mut app = app_with_catalog().await;
    app.signup_and_login("ada@example.com").await;
    app.post("/cart/add", &[("product_id", "7")]).await;

    app.store().set_fail_writes(true);
    let response = app.post("/cart/add", &[("product_id", "7")]).await;
    app.store().set_fail_writes(false);

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "Internal server error");

    let cart = app.get("/cart").await;
    assert_eq!(cart.body["item_count"], 1);
}
