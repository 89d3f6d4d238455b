use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use storefront::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = storefront::api::create_app_state_from_config(config)
        .await
        .expect("Failed to create app state");
    storefront::api::router(state).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn sample_user(username: &str, email: &str) -> Value {
    json!({
        "username": username,
        "email": email,
        "password": "s3cret-enough",
        "first_name": "Test",
        "last_name": "User",
    })
}

fn sample_product(name: &str, price: f64) -> Value {
    json!({
        "name": name,
        "price": price,
        "stock": 10,
    })
}

async fn create_user(app: &Router, username: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/users",
        Some(sample_user(username, email)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, name: &str, price: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/v1/products",
        Some(sample_product(name, price)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn test_user_crud() {
    let app = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(sample_user("alice", "alice@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["is_active"], true);
    // The password hash must never be exposed
    assert!(body["data"].get("password").is_none());

    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alice@example.com");

    // Sparse update: patch one field, add another, leave the rest alone
    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/users/{id}"),
        Some(json!({ "first_name": "Alicia", "phone_number": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["first_name"], "Alicia");
    assert_eq!(body["data"]["phone_number"], "555-0100");
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"]["updated_at"].is_string());

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/users/{id}"),
        Some(json!({ "phone_number": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["phone_number"].is_null());
    assert_eq!(body["data"]["first_name"], "Alicia");

    // Delete is idempotent: first true, then false
    let (status, body) = send(&app, "DELETE", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], false);

    let (status, _) = send(&app, "GET", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_validation() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(sample_user("abc", "short-name@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(sample_user("bademail", "not-an-email")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut user = sample_user("weakpass", "weak@example.com");
    user["password"] = json!("short");
    let (status, _) = send(&app, "POST", "/api/v1/users", Some(user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = spawn_app().await;

    create_user(&app, "carol", "carol@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/users",
        Some(sample_user("carol", "other@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_product_crud_and_soft_delete() {
    let app = spawn_app().await;

    let id = create_product(&app, "Widget", 9.99).await;

    let (status, body) = send(&app, "GET", "/api/v1/products/name/Widget", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_str().unwrap(), id);

    let (status, _) = send(&app, "GET", "/api/v1/products/name/Missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/products/{id}"),
        Some(json!({ "price": 12.5, "category": "tools" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"].as_f64().unwrap(), 12.5);
    assert_eq!(body["data"]["category"], "tools");
    assert_eq!(body["data"]["name"], "Widget");

    // Deleting a product deactivates it; the row survives
    let (status, body) = send(&app, "DELETE", &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (status, body) = send(&app, "GET", &format!("/api/v1/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_active"], false);
}

#[tokio::test]
async fn test_product_validation() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(json!({ "name": "Bad", "price": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(json!({ "name": "", "price": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_rejected_when_any_product_unavailable() {
    let app = spawn_app().await;

    let user_id = create_user(&app, "dave1", "dave1@example.com").await;
    let product_a = create_product(&app, "Gadget A", 10.0).await;
    let product_b = create_product(&app, "Gadget B", 5.0).await;

    // Deactivate product B, then try to order both
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/products/{product_b}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": user_id,
            "items": [
                { "product_id": product_a, "quantity": 2 },
                { "product_id": product_b, "quantity": 1 },
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains(&product_b));

    // Nothing was persisted, not even the valid first line
    let (_, body) = send(&app, "GET", "/api/v1/orders", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (_, body) = send(&app, "GET", "/api/v1/order-items", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // Retry with only the active product
    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": user_id,
            "items": [{ "product_id": product_a, "quantity": 2 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"].as_f64().unwrap(), 20.0);
}

#[tokio::test]
async fn test_order_snapshots_price_at_purchase() {
    let app = spawn_app().await;

    let user_id = create_user(&app, "erin1", "erin1@example.com").await;
    let product_id = create_product(&app, "Doodad", 10.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": user_id,
            "items": [{ "product_id": product_id, "quantity": 3 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["total_amount"].as_f64().unwrap(), 30.0);

    // A later price change must not affect the placed order
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/products/{product_id}"),
        Some(json!({ "price": 99.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/orders/{order_id}/items"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["price_at_purchase"].as_f64().unwrap(), 10.0);
    assert_eq!(items[0]["quantity"], 3);

    let (status, body) = send(&app, "GET", &format!("/api/v1/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"].as_f64().unwrap(), 30.0);
}

#[tokio::test]
async fn test_order_requires_existing_user_and_valid_quantity() {
    let app = spawn_app().await;

    let product_id = create_product(&app, "Thing", 4.0).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": "00000000-0000-0000-0000-000000000000",
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let user_id = create_user(&app, "frank", "frank@example.com").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": user_id,
            "items": [{ "product_id": product_id, "quantity": 0 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({ "user_id": user_id, "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_orders_listing() {
    let app = spawn_app().await;

    let user_id = create_user(&app, "grace", "grace@example.com").await;
    let other_id = create_user(&app, "heidi", "heidi@example.com").await;
    let product_id = create_product(&app, "Book", 15.0).await;

    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/v1/orders",
            Some(json!({
                "user_id": user_id,
                "items": [{ "product_id": product_id, "quantity": 1 }],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/users/{user_id}/orders"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/users/{other_id}/orders"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = send(
        &app,
        "GET",
        "/api/v1/users/00000000-0000-0000-0000-000000000000/orders",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_delete_cascades_to_items() {
    let app = spawn_app().await;

    let user_id = create_user(&app, "ivan1", "ivan1@example.com").await;
    let product_id = create_product(&app, "Lamp", 25.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": user_id,
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "DELETE", &format!("/api/v1/orders/{order_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], true);

    let (_, body) = send(&app, "GET", "/api/v1/order-items", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // The product is untouched
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/v1/products/{product_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_order_total_patch() {
    let app = spawn_app().await;

    let user_id = create_user(&app, "judy1", "judy1@example.com").await;
    let product_id = create_product(&app, "Mug", 8.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(json!({
            "user_id": user_id,
            "items": [{ "product_id": product_id, "quantity": 1 }],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}"),
        Some(json!({ "total_amount": 7.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_amount"].as_f64().unwrap(), 7.5);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/v1/orders/{order_id}"),
        Some(json!({ "total_amount": -1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/v1/orders/00000000-0000-0000-0000-000000000000",
        Some(json!({ "total_amount": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_storage_failure_is_service_unavailable() {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let shared = std::sync::Arc::new(
        storefront::state::SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );
    let store = shared.store.clone();
    let state = storefront::api::create_app_state(shared).await.unwrap();
    let app = storefront::api::router(state).await;

    // Kill the pool out from under the app; requests must report the
    // outage as 503, not an internal error
    store.conn.close().await.unwrap();

    let (status, body) = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/products",
        Some(sample_product("Unreachable", 1.0)),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_seeded_admin_user() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/users", None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["data"].as_array().unwrap();
    assert!(
        users
            .iter()
            .any(|u| u["username"] == "admin" && u["is_superuser"] == true)
    );
}
