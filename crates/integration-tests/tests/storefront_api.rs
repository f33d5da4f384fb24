//! HTTP tests against a storefront served on an ephemeral port.
//!
//! Each `reqwest::Client` keeps its own cookie jar, so one client is one
//! logged-in browser session.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use techmart_integration_tests::{TEST_PASSWORD, TestServer, test_shop};
use techmart_ledger::accounts::BOOTSTRAP_ADMIN_EMAIL;

async fn server() -> TestServer {
    let shop = test_shop().unwrap();
    shop.seed_demo_catalog().unwrap();
    TestServer::start(shop).await.unwrap()
}

/// Register `email` and return its logged-in client.
async fn register(server: &TestServer, email: &str) -> Client {
    let client = server.client().unwrap();
    let resp = client
        .post(server.url("/auth/register"))
        .json(&json!({"email": email, "password": TEST_PASSWORD, "name": "Test"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    client
}

async fn error_code(resp: reqwest::Response) -> String {
    let body: Value = resp.json().await.unwrap();
    body["error"].as_str().unwrap_or_default().to_string()
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn test_health() {
    let server = server().await;
    let resp = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_product_listing_and_filters() {
    let server = server().await;
    let client = server.client().unwrap();

    let all: Vec<Value> = client
        .get(server.url("/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), 8);

    let footwear: Vec<Value> = client
        .get(server.url("/products?search=&category=footwear&sort=price_asc"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = footwear.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Nike Air Max 270", "Adidas Ultraboost 22"]);

    let resp = client
        .get(server.url("/products?sort=cheapest"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let product: Value = client
        .get(server.url("/products/P004"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["name"], "Sony WH-1000XM5");
    assert_eq!(product["price"], "399.99");

    let resp = client.get(server.url("/products/P999")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(resp).await, "not_found");

    let categories: Vec<String> = client
        .get(server.url("/categories"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(categories, ["Electronics", "Clothing", "Footwear"]);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_login() {
    let server = server().await;
    let client = server.client().unwrap();

    for path in ["/cart", "/orders", "/account", "/admin/dashboard"] {
        let resp = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{path}");
    }
    let resp = client.post(server.url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Login required");
}

#[tokio::test]
async fn test_register_login_logout() {
    let server = server().await;
    let client = register(&server, "alice@example.com").await;

    let account: Value = client
        .get(server.url("/account"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(account["account"]["email"], "alice@example.com");
    assert_eq!(account["account"]["is_admin"], false);
    assert!(account["account"].get("password_hash").is_none());
    assert_eq!(account["stats"]["order_count"], 0);

    let resp = client.post(server.url("/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = client.get(server.url("/account")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(server.url("/auth/login"))
        .json(&json!({"email": "alice@example.com", "password": "wrong password"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(server.url("/auth/login"))
        .json(&json!({"email": "ALICE@example.com", "password": TEST_PASSWORD}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = client.get(server.url("/account")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_registration_errors() {
    let server = server().await;
    register(&server, "alice@example.com").await;
    let client = server.client().unwrap();

    let cases = [
        (json!({"email": "alice@example.com", "password": TEST_PASSWORD}), StatusCode::CONFLICT),
        (json!({"email": "not-an-email", "password": TEST_PASSWORD}), StatusCode::BAD_REQUEST),
        (json!({"email": "bob@example.com", "password": "short"}), StatusCode::BAD_REQUEST),
    ];
    for (body, expected) in cases {
        let resp = client
            .post(server.url("/auth/register"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), expected, "{body}");
    }
}

// ============================================================================
// Cart and checkout
// ============================================================================

#[tokio::test]
async fn test_cart_checkout_and_reorder() {
    let server = server().await;
    let client = register(&server, "alice@example.com").await;

    let cart: Value = client
        .post(server.url("/cart/items"))
        .json(&json!({"product_id": "P005", "quantity": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["total"], "139.98");

    let cart: Value = client
        .put(server.url("/cart/items/P005"))
        .json(&json!({"quantity": 3}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["lines"][0]["quantity"], 3);

    let resp = client
        .post(server.url("/cart/items"))
        .json(&json!({"product_id": "P006", "quantity": 9}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "insufficient_stock");

    let resp = client.post(server.url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.unwrap();
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["total"], "209.97");
    let order_id = order["id"].as_str().unwrap().to_string();

    let jeans = server.shop.catalog().get(&"P005".parse().unwrap()).unwrap();
    assert_eq!(jeans.stock, 37);

    let resp = client.post(server.url("/checkout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "empty_cart");

    let orders: Vec<Value> = client
        .get(server.url("/orders"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);

    let outcome: Value = client
        .post(server.url(&format!("/orders/{order_id}/reorder")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["added"], json!([["P005", 3]]));

    let resp = client.delete(server.url("/cart")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let cart: Value = client
        .get(server.url("/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
async fn test_orders_are_private() {
    let server = server().await;
    let alice = register(&server, "alice@example.com").await;
    let bob = register(&server, "bob@example.com").await;

    alice
        .post(server.url("/cart/items"))
        .json(&json!({"product_id": "P001"}))
        .send()
        .await
        .unwrap();
    let order: Value = alice
        .post(server.url("/checkout"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let path = format!("/orders/{}", order["id"].as_str().unwrap());

    let resp = alice.get(server.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = bob.get(server.url(&path)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = bob
        .post(server.url(&format!("{path}/reorder")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let server = server().await;
    let client = register(&server, "alice@example.com").await;

    let resp = client.get(server.url("/admin/dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");
    let resp = client
        .put(server.url("/admin/products/P001/stock"))
        .json(&json!({"stock": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_manages_orders_and_users() {
    let server = server().await;
    let admin = register(&server, BOOTSTRAP_ADMIN_EMAIL).await;
    let alice = register(&server, "alice@example.com").await;

    alice
        .post(server.url("/cart/items"))
        .json(&json!({"product_id": "P002", "quantity": 2}))
        .send()
        .await
        .unwrap();
    let order: Value = alice
        .post(server.url("/checkout"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let order_id = order["id"].as_str().unwrap().to_string();

    let dashboard: Value = admin
        .get(server.url("/admin/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["order_count"], 1);
    assert_eq!(dashboard["revenue"], "1999.98");
    assert_eq!(dashboard["status_counts"]["Pending"], 1);

    let resp = admin
        .post(server.url(&format!("/admin/orders/{order_id}/status")))
        .json(&json!({"status": "Processing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .post(server.url(&format!("/admin/orders/{order_id}/status")))
        .json(&json!({"status": "Pending"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(resp).await, "invalid_transition");

    let cancelled: Value = admin
        .post(server.url(&format!("/admin/orders/{order_id}/cancel")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cancelled["status"], "Cancelled");
    let phone = server.shop.catalog().get(&"P002".parse().unwrap()).unwrap();
    assert_eq!(phone.stock, 30);

    // Granting and revoking admin takes effect on the next request.
    let resp = admin
        .put(server.url("/admin/users/alice@example.com/admin"))
        .json(&json!({"is_admin": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = alice.get(server.url("/admin/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    admin
        .put(server.url("/admin/users/alice@example.com/admin"))
        .json(&json!({"is_admin": false}))
        .send()
        .await
        .unwrap();
    let resp = alice.get(server.url("/admin/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = admin
        .put(server.url(&format!("/admin/users/{BOOTSTRAP_ADMIN_EMAIL}/admin")))
        .json(&json!({"is_admin": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_product_crud() {
    let server = server().await;
    let admin = register(&server, BOOTSTRAP_ADMIN_EMAIL).await;

    let resp = admin
        .post(server.url("/admin/products"))
        .json(&json!({
            "name": "Desk Lamp",
            "price": "24.50",
            "category": "Home",
            "stock": 4,
            "specs": ["LED", "Dimmable"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let lamp: Value = resp.json().await.unwrap();
    assert_eq!(lamp["id"], "P009");

    let updated: Value = admin
        .patch(server.url("/admin/products/P009"))
        .json(&json!({"price": "19.99", "rating": 4.5}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["price"], "19.99");
    assert_eq!(updated["name"], "Desk Lamp");

    let resp = admin
        .patch(server.url("/admin/products/P009"))
        .json(&json!({"rating": 7.0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let stocked: Value = admin
        .put(server.url("/admin/products/P009/stock"))
        .json(&json!({"stock": 12}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stocked["stock"], 12);

    let resp = admin
        .delete(server.url("/admin/products/P009"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = admin
        .delete(server.url("/admin/products/P009"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
