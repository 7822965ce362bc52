//! End-to-end tests driving the router through `tower::ServiceExt::oneshot`.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use kiosk_api::{build_app, AppState};
use kiosk_core::LifecyclePolicy;
use kiosk_db::{Database, DbConfig};

const T0: i64 = 1_700_000_000_000;
const H: i64 = 3_600_000;

struct TestApp {
    app: Router,
    now: Arc<AtomicI64>,
}

impl TestApp {
    async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Arc::new(AtomicI64::new(T0));
        let clock = now.clone();
        let state = AppState::new(db, LifecyclePolicy::default())
            .with_clock(Arc::new(move || clock.load(Ordering::SeqCst)));

        TestApp {
            app: build_app(state),
            now,
        }
    }

    fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    /// Creates meal M "Burger" (500) with add-on "Bacon" (+150); returns (meal_id, addon_id).
    async fn seed_burger(&self) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/menu",
                json!({
                    "name": "Burger",
                    "price": 500,
                    "tags": ["beef"],
                    "addons": [{ "name": "Bacon", "price_delta": 150 }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let meal_id = body["id"].as_str().unwrap().to_string();

        let (_, menu) = self.get("/api/menu").await;
        let addon_id = menu[0]["addons"][0]["id"].as_str().unwrap().to_string();
        (meal_id, addon_id)
    }

    async fn place(&self, body: Value) -> String {
        let (status, body) = self.post("/api/orders", body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn alive_and_health() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "alive" }));

    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn options_answers_no_content() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/orders")
        .header(header::ORIGIN, "http://kiosk.local")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn bare_options_answers_no_content() {
    let app = TestApp::new().await;

    // No Origin or Access-Control-Request-Method headers
    for uri in ["/api/orders", "/api/orders/any/units/any", "/api/menu"] {
        let (status, _) = app.send(Method::OPTIONS, uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{uri}");
    }
}

#[tokio::test]
async fn overflowing_order_is_a_validation_error() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/api/menu", json!({ "name": "Gold Burger", "price": i64::MAX / 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let meal_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .post(
            "/api/orders",
            json!({ "items": [{ "mealId": meal_id, "quantity": 3 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, orders) = app.get("/api/orders").await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn menu_wire_shape_and_updates() {
    let app = TestApp::new().await;
    let (meal_id, _) = app.seed_burger().await;

    let (status, menu) = app.get("/api/menu").await;
    assert_eq!(status, StatusCode::OK);
    let item = &menu[0];
    assert_eq!(item["name"], "Burger");
    assert_eq!(item["price"], 500);
    assert_eq!(item["isAvailable"], true);
    assert_eq!(item["tags"], json!(["beef"]));
    assert_eq!(item["addons"][0]["price"], 150);
    assert_eq!(item["addons"][0]["max_select"], 1);
    assert_eq!(item["addons"][0]["is_required"], false);

    let (status, body) = app
        .patch(&format!("/api/menu/{meal_id}"), json!({ "price": 700 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (_, menu) = app.get("/api/menu").await;
    assert_eq!(menu[0]["price"], 700);
    assert_eq!(menu[0]["addons"].as_array().unwrap().len(), 1);

    let (status, _) = app.send(Method::DELETE, &format!("/api/menu/{meal_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, menu) = app.get("/api/menu").await;
    assert_eq!(menu, json!([]));

    let (status, body) = app.send(Method::DELETE, "/api/menu/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn invalid_menu_item_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/api/menu", json!({ "name": "", "price": 100 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn place_and_read_order() {
    let app = TestApp::new().await;
    let (meal_id, addon_id) = app.seed_burger().await;

    let id = app
        .place(json!({ "items": [{ "mealId": meal_id, "addons": [addon_id], "quantity": 2 }] }))
        .await;

    let (status, order) = app.get(&format!("/api/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["subtotal"], 1300);
    assert_eq!(order["tax"], 0);
    assert_eq!(order["total"], 1300);
    assert_eq!(order["createdAt"], T0);
    assert_eq!(order["lockedAt"], T0 + 4 * H);
    assert_eq!(order["expiresAt"], T0 + 24 * H);

    let line = &order["items"][0];
    assert_eq!(line["mealId"], meal_id.as_str());
    assert_eq!(line["name"], "Burger");
    assert_eq!(line["unitPrice"], 650);
    assert_eq!(line["quantity"], 2);
    assert_eq!(line["addons"][0]["name"], "Bacon");
    assert_eq!(line["addons"][0]["price"], 150);
    assert_eq!(line["units"].as_array().unwrap().len(), 2);
    assert_eq!(line["units"][0]["status"], "pending");
}

#[tokio::test]
async fn order_placement_errors() {
    let app = TestApp::new().await;
    let (meal_id, _) = app.seed_burger().await;

    let (status, body) = app.post("/api/orders", json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "items required");

    let (status, body) = app
        .post("/api/orders", json!({ "items": [{ "mealId": "nope" }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_FOUND");

    // Add-on owned by another meal
    let (_, fries) = app
        .post(
            "/api/menu",
            json!({ "name": "Fries", "price": 250, "addons": [{ "name": "Cheese", "price_delta": 90 }] }),
        )
        .await;
    let fries_id = fries["id"].as_str().unwrap();
    let (_, menu) = app.get("/api/menu").await;
    let cheese = menu
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == fries_id)
        .unwrap()["addons"][0]["id"]
        .clone();

    let (status, body) = app
        .post("/api/orders", json!({ "items": [{ "mealId": meal_id, "addons": [cheese] }] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REFERENCE");

    let (_, orders) = app.get("/api/orders").await;
    assert_eq!(orders, json!([]));
}

#[tokio::test]
async fn malformed_json_is_internal() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"items\": ["))
        .unwrap();
    let response = app.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "INTERNAL");
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn unit_roll_up_and_status_updates() {
    let app = TestApp::new().await;
    let (meal_id, _) = app.seed_burger().await;
    let id = app
        .place(json!({ "items": [{ "mealId": meal_id, "quantity": 2 }] }))
        .await;

    let (_, order) = app.get(&format!("/api/orders/{id}")).await;
    let units: Vec<String> = order["items"][0]["units"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_str().unwrap().to_string())
        .collect();

    let (status, body) = app
        .patch(&format!("/api/orders/{id}/units/{}", units[0]), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    for unit in &units {
        let (status, body) = app
            .patch(
                &format!("/api/orders/{id}/units/{unit}"),
                json!({ "status": "ready" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
    }

    let (_, order) = app.get(&format!("/api/orders/{id}")).await;
    assert_eq!(order["status"], "ready");

    let (status, _) = app
        .patch(&format!("/api/orders/{id}"), json!({ "status": "completed" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, active) = app.get("/api/orders?active=true").await;
    assert_eq!(active, json!([]));
    let (_, all) = app.get("/api/orders").await;
    assert_eq!(all[0]["id"], id.as_str());
    assert!(all[0].get("items").is_none());

    let (status, body) = app
        .patch(&format!("/api/orders/{id}"), json!({ "status": "done" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn unit_of_other_order_is_invalid_reference() {
    let app = TestApp::new().await;
    let (meal_id, _) = app.seed_burger().await;
    let a = app.place(json!({ "items": [{ "mealId": meal_id }] })).await;
    let b = app.place(json!({ "items": [{ "mealId": meal_id }] })).await;

    let (_, order_b) = app.get(&format!("/api/orders/{b}")).await;
    let b_unit = order_b["items"][0]["units"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .patch(&format!("/api/orders/{a}/units/{b_unit}"), json!({ "status": "ready" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REFERENCE");

    let (status, _) = app
        .patch(&format!("/api/orders/{a}/units/missing"), json!({ "status": "ready" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lock_then_expiry() {
    let app = TestApp::new().await;
    let (meal_id, _) = app.seed_burger().await;
    let id = app.place(json!({ "items": [{ "mealId": meal_id }] })).await;

    app.advance(4 * H + 1);

    let (status, body) = app
        .patch(&format!("/api/orders/{id}"), json!({ "status": "preparing" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "LOCKED");

    // Locked is checked before the body
    let (status, _) = app.patch(&format!("/api/orders/{id}"), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get(&format!("/api/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    app.advance(20 * H);

    let (status, body) = app.get(&format!("/api/orders/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, all) = app.get("/api/orders").await;
    assert_eq!(all, json!([]));
}
