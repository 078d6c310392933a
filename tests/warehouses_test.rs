mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use warehouse_api::auth::Role;

use common::TestApp;

#[tokio::test]
async fn warehouse_crud_is_admin_only() {
    let app = TestApp::new().await;
    let body = json!({ "warehouseId": "WH-1", "warehouseName": "Main hall", "warehouseType": "Main" });

    let operator = app.post("/api/warehouses", Role::Operator, body.clone()).await;
    assert_eq!(operator.status, StatusCode::FORBIDDEN);

    let created = app.post("/api/warehouses", Role::Admin, body.clone()).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.raw);
    assert_eq!(created.data()["isActive"], true);

    let duplicate = app.post("/api/warehouses", Role::Admin, body).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_warehouse_type_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/warehouses",
            Role::Admin,
            json!({ "warehouseId": "WH-2", "warehouseName": "Odd", "warehouseType": "Garage" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn warehouses_are_listed_by_name() {
    let app = TestApp::new().await;
    for (id, name) in [("WH-B", "Buffer"), ("WH-A", "Assembly"), ("WH-C", "Cutting")] {
        app.post(
            "/api/warehouses",
            Role::Admin,
            json!({ "warehouseId": id, "warehouseName": name }),
        )
        .await;
    }

    let list = app.get("/api/warehouses", Role::Viewer).await;
    assert_eq!(list.status, StatusCode::OK);
    let names: Vec<&str> = list
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["warehouseName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Assembly", "Buffer", "Cutting"]);
    assert_eq!(list.body["pagination"]["total"], 3);
}

#[tokio::test]
async fn update_requires_at_least_one_field() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-U").await;

    let empty = app
        .request(
            Method::PUT,
            "/api/warehouses/WH-U",
            None,
            Some(app.token(Role::Admin)),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.message(), "Nothing to update");

    let renamed = app
        .put(
            "/api/warehouses/WH-U",
            Role::Admin,
            json!({ "warehouseName": "Renamed", "capacity": 40 }),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK, "{}", renamed.raw);
    assert_eq!(renamed.data()["warehouseName"], "Renamed");
    assert_eq!(renamed.data()["capacity"], 40);

    let missing = app
        .put("/api/warehouses/NOPE", Role::Admin, json!({ "location": "Brno" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_deactivates_only_empty_warehouses() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-FULL").await;
    app.seed_warehouse("WH-EMPTY").await;

    let order_id = app.seed_order("6001", &[("Plate", 3)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);
    app.post(
        "/api/inventory/move",
        Role::Admin,
        json!({ "barcode": barcode, "warehouseId": "WH-FULL", "position": "P-1", "quantity": 3 }),
    )
    .await;

    let refused = app.delete("/api/warehouses/WH-FULL", Role::Admin).await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);

    let deactivated = app.delete("/api/warehouses/WH-EMPTY", Role::Admin).await;
    assert_eq!(deactivated.status, StatusCode::OK);
    assert_eq!(deactivated.data()["isActive"], false);

    let inactive = app.get("/api/warehouses?active=false", Role::Viewer).await;
    let ids: Vec<&str> = inactive
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["warehouseId"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["WH-EMPTY"]);

    let detail = app.get("/api/warehouses/WH-FULL", Role::Viewer).await;
    assert_eq!(detail.status, StatusCode::OK);
    let stock = detail.data()["inventory"].as_array().unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0]["itemName"], "Plate");
    assert_eq!(stock[0]["qtyAvailable"], 3);
}

#[tokio::test]
async fn positions_and_vacancy() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-P").await;

    for name in ["A-01", "A-02"] {
        let created = app
            .post(
                "/api/warehouse-positions",
                Role::Operator,
                json!({ "warehouseId": "WH-P", "positionName": name }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.raw);
    }

    let duplicate = app
        .post(
            "/api/warehouse-positions",
            Role::Operator,
            json!({ "warehouseId": "WH-P", "positionName": "A-01" }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let limited = app
        .post(
            "/api/warehouse-positions",
            Role::OperatorLimited,
            json!({ "warehouseId": "WH-P", "positionName": "A-03" }),
        )
        .await;
    assert_eq!(limited.status, StatusCode::FORBIDDEN);

    let unknown_warehouse = app
        .post(
            "/api/warehouse-positions",
            Role::Operator,
            json!({ "warehouseId": "WH-NONE", "positionName": "A-01" }),
        )
        .await;
    assert_eq!(unknown_warehouse.status, StatusCode::NOT_FOUND);

    let order_id = app.seed_order("6002", &[("Plate", 2)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);
    app.post(
        "/api/inventory/move",
        Role::Admin,
        json!({ "barcode": barcode, "warehouseId": "WH-P", "position": "A-01", "quantity": 2 }),
    )
    .await;

    let vacant = app
        .get("/api/warehouse-positions/vacant?warehouseId=WH-P", Role::Viewer)
        .await;
    assert_eq!(vacant.status, StatusCode::OK);
    let names: Vec<&str> = vacant
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["positionName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["A-02"]);

    let listed = app
        .get("/api/warehouse-positions?warehouseId=WH-P", Role::Viewer)
        .await;
    assert_eq!(listed.body["pagination"]["total"], 2);
}
