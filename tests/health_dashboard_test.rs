mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use warehouse_api::auth::Role;

use common::TestApp;

#[tokio::test]
async fn health_is_public_and_bare() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["environment"], "test");
    assert_eq!(response.body["database"]["connected"], true);
    assert!(response.body.get("success").is_none());
}

#[tokio::test]
async fn unknown_endpoints_use_the_error_envelope() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/does-not-exist", None, None)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.message(), "Endpoint not found");
}

#[tokio::test]
async fn request_ids_are_echoed_or_generated() {
    let app = TestApp::new().await;
    let response = app.request(Method::GET, "/api/health", None, None).await;
    let generated = response.headers["x-request-id"].to_str().unwrap();
    assert!(!generated.is_empty());
}

#[tokio::test]
async fn dashboard_summarises_the_floor() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-D").await;
    let order_id = app.seed_order("9901", &[("Plate", 6)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);
    app.post(
        "/api/receive",
        Role::OperatorLimited,
        json!({ "barcode": barcode, "quantityReceived": 6 }),
    )
    .await;
    app.post(
        "/api/inventory/move",
        Role::OperatorLimited,
        json!({ "barcode": barcode, "warehouseId": "WH-D", "position": "D-1", "quantity": 6 }),
    )
    .await;
    app.seed_production("FRAME-30", &["Cutting"]).await;

    let response = app.request(Method::GET, "/api/home", None, None).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.body["success"], true);

    let data = response.data();
    assert_eq!(data["warehouses"]["totalWarehouses"], 1);
    assert_eq!(data["warehouses"]["activeWarehouses"], 1);
    assert_eq!(data["inventory"]["totalItems"], 1);
    assert_eq!(data["inventory"]["totalQuantity"], 6);

    let movements = data["recentMovements"].as_array().unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0]["movementType"], "move");
    assert_eq!(movements[0]["itemName"], "Plate");

    let production = data["production"].as_array().unwrap();
    assert_eq!(production.len(), 1);
    assert_eq!(production[0]["status"], "started");
    assert_eq!(production[0]["count"], 1);

    let by_type = data["orders"]["byType"].as_array().unwrap();
    assert_eq!(by_type[0]["status"], "zakazka");
    assert_eq!(by_type[0]["count"], 1);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["info"]["title"], "Warehouse API");
    assert!(response.body["paths"]["/api/orders/create"].is_object());
}
