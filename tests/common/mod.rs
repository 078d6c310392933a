#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use warehouse_api::{
    auth::{NewUser, Role},
    build_router,
    config::AppConfig,
    db, AppState,
};

pub const PASSWORD: &str = "correct-horse-battery";
const TEST_SECRET: &str =
    "integration-tests-signing-key-q7Wm2Rx9Lp4Tz8Kv3Hn6Bc1Yd5Fg0Js-warehouse-api-test-suite";

/// A decoded response from the router.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: String,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// Full application over a migrated SQLite file, with one account per role.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    tokens: HashMap<Role, String>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("warehouse_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.cors_allow_any_origin = true;
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg).expect("valid auth config for tests");

        let mut tokens = HashMap::new();
        for role in [
            Role::Admin,
            Role::Operator,
            Role::OperatorLimited,
            Role::Viewer,
        ] {
            let username = format!("{}_user", role);
            state
                .auth
                .register(NewUser {
                    username: username.clone(),
                    email: format!("{}@example.com", username),
                    password: PASSWORD.to_string(),
                    role,
                    full_name: None,
                })
                .await
                .expect("seed user");
            let login = state
                .auth
                .login(&username, PASSWORD)
                .await
                .expect("seed login");
            tokens.insert(role, login.access_token);
        }

        let router = build_router(state.clone()).expect("router");

        Self {
            router,
            state,
            tokens,
            _dir: dir,
        }
    }

    pub fn token(&self, role: Role) -> &str {
        self.tokens
            .get(&role)
            .map(String::as_str)
            .expect("token for seeded role")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read response body");
        let raw = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }

    pub async fn get(&self, uri: &str, role: Role) -> TestResponse {
        self.request(Method::GET, uri, None, Some(self.token(role))).await
    }

    pub async fn post(&self, uri: &str, role: Role, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(self.token(role)))
            .await
    }

    pub async fn put(&self, uri: &str, role: Role, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), Some(self.token(role)))
            .await
    }

    pub async fn delete(&self, uri: &str, role: Role) -> TestResponse {
        self.request(Method::DELETE, uri, None, Some(self.token(role)))
            .await
    }

    /// Creates an order with the given `(item name, quantity)` lines and returns its id.
    pub async fn seed_order(&self, sap_number: &str, items: &[(&str, i32)]) -> i32 {
        let items: Vec<Value> = items
            .iter()
            .map(|(name, qty)| {
                json!({
                    "itemName": name,
                    "quantity": qty,
                    "dimension": "100x50",
                    "material": "S235",
                    "position": "A-01"
                })
            })
            .collect();
        let response = self
            .post(
                "/api/orders/create",
                Role::Admin,
                json!({ "sapNumber": sap_number, "supplier": "Ferona", "items": items }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.raw);
        response.data()["orderId"].as_i64().expect("order id") as i32
    }

    /// Barcodes of an order's items, in insertion order.
    pub async fn barcodes(&self, order_id: i32) -> Vec<String> {
        let response = self
            .get(&format!("/api/orders/{}", order_id), Role::Viewer)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
        response.data()["items"]
            .as_array()
            .expect("items")
            .iter()
            .map(|item| item["barcode"].as_str().expect("barcode").to_string())
            .collect()
    }

    pub async fn seed_warehouse(&self, warehouse_id: &str) {
        let response = self
            .post(
                "/api/warehouses",
                Role::Admin,
                json!({ "warehouseId": warehouse_id, "warehouseName": format!("Hall {}", warehouse_id) }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.raw);
    }

    /// Starts a work order with the named stages and returns `(work order id, stage ids)`.
    pub async fn seed_production(&self, product_code: &str, stages: &[&str]) -> (i32, Vec<i32>) {
        let stages: Vec<Value> = stages
            .iter()
            .map(|name| json!({ "stageName": name }))
            .collect();
        let response = self
            .post(
                "/api/production/start",
                Role::Operator,
                json!({ "productCode": product_code, "quantityIn": 10, "stages": stages }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.raw);
        let data = response.data();
        let work_order_id = data["workOrderId"].as_i64().expect("work order id") as i32;
        let stage_ids = data["stages"]
            .as_array()
            .expect("stages")
            .iter()
            .map(|s| s["stageId"].as_i64().expect("stage id") as i32)
            .collect();
        (work_order_id, stage_ids)
    }
}
