mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use warehouse_api::auth::Role;

use common::TestApp;

#[tokio::test]
async fn create_and_look_up_an_order() {
    let app = TestApp::new().await;
    let order_id = app.seed_order("4500012345", &[("Steel plate", 4), ("Bolt M8", 100)]).await;

    let by_id = app.get(&format!("/api/orders/{}", order_id), Role::Viewer).await;
    assert_eq!(by_id.status, StatusCode::OK);
    let order = by_id.data();
    assert_eq!(order["sapNumber"], "4500012345");
    assert_eq!(order["status"], "pending");
    let qr = order["orderQR"].as_str().unwrap().to_string();
    assert!(qr.starts_with("ORD-4500012345-"));

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items
        .iter()
        .all(|item| item["barcode"].as_str().unwrap().starts_with("MAT-")));
    assert_ne!(items[0]["barcode"], items[1]["barcode"]);

    let by_qr = app.get(&format!("/api/orders/qr/{}", qr), Role::Viewer).await;
    assert_eq!(by_qr.status, StatusCode::OK);
    assert_eq!(by_qr.data()["orderId"], order_id);
}

#[tokio::test]
async fn order_list_is_paginated_and_filtered() {
    let app = TestApp::new().await;
    for sap in ["1001", "1002", "1003"] {
        app.seed_order(sap, &[("Plate", 1)]).await;
    }

    let page = app.get("/api/orders?page=2&limit=2", Role::Viewer).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.data().as_array().unwrap().len(), 1);
    let pagination = &page.body["pagination"];
    assert_eq!(pagination["total"], 3);
    assert_eq!(pagination["totalPages"], 2);
    assert_eq!(pagination["hasNextPage"], false);
    assert_eq!(pagination["hasPrevPage"], true);

    let filtered = app.get("/api/orders?status=complete", Role::Viewer).await;
    assert_eq!(filtered.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn supplier_filter_matches_the_whole_name() {
    let app = TestApp::new().await;
    app.seed_order("1101", &[("Plate", 1)]).await;

    let exact = app.get("/api/orders?supplier=Ferona", Role::Viewer).await;
    assert_eq!(exact.body["pagination"]["total"], 1);

    let partial = app.get("/api/orders?supplier=Fer", Role::Viewer).await;
    assert_eq!(partial.status, StatusCode::OK);
    assert_eq!(partial.body["pagination"]["total"], 0);
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() {
    let app = TestApp::new().await;
    app.seed_order("1201", &[("Plate", 1)]).await;

    for uri in [
        "/api/orders?page=9223372036854775807&limit=100",
        "/api/orders?page=100000000000000000&limit=100",
        "/api/inventory?page=9223372036854775807",
        "/api/warehouses?page=9223372036854775807&limit=1",
    ] {
        let response = app.get(uri, Role::Viewer).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}: {}", response.raw);
        assert!(response.data().as_array().unwrap().is_empty(), "{uri}");
        assert_eq!(response.body["pagination"]["hasPrevPage"], true);
    }
}

#[tokio::test]
async fn duplicate_sap_number_conflicts() {
    let app = TestApp::new().await;
    app.seed_order("777", &[("Plate", 1)]).await;

    let again = app
        .post(
            "/api/orders/create",
            Role::OperatorLimited,
            json!({ "sapNumber": "777", "supplier": "Other", "items": [] }),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["success"], false);
}

#[tokio::test]
async fn invalid_order_payload_lists_field_errors() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/orders/create",
            Role::Admin,
            json!({ "sapNumber": "45A", "supplier": "Ferona", "items": [] }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.body["errors"].as_array().expect("field errors");
    assert!(errors.iter().any(|e| e["field"] == "sapNumber"));
}

#[tokio::test]
async fn malformed_json_is_rejected_with_envelope() {
    let app = TestApp::new().await;
    let response = app
        .request(
            Method::POST,
            "/api/orders/create",
            None,
            Some(app.token(Role::Admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn partial_receipts_complete_the_order() {
    let app = TestApp::new().await;
    let order_id = app.seed_order("2001", &[("Plate", 10)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);

    let first = app
        .post(
            "/api/receive/partial",
            Role::OperatorLimited,
            json!({ "barcode": barcode, "quantityReceived": 4 }),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.raw);
    assert_eq!(first.data()["qtyReceived"], 4);
    assert_eq!(first.data()["qtyRemaining"], 6);
    assert_eq!(first.data()["status"], "partial");

    let order = app.get(&format!("/api/orders/{}", order_id), Role::Viewer).await;
    assert_eq!(order.data()["status"], "partial");

    let second = app
        .post(
            "/api/receive/partial",
            Role::OperatorLimited,
            json!({ "barcode": barcode, "quantityReceived": 6 }),
        )
        .await;
    assert_eq!(second.data()["qtyReceived"], 10);
    assert_eq!(second.data()["status"], "complete");

    let order = app.get(&format!("/api/orders/{}", order_id), Role::Viewer).await;
    assert_eq!(order.data()["status"], "complete");
}

#[tokio::test]
async fn full_receipt_replaces_the_received_quantity() {
    let app = TestApp::new().await;
    let order_id = app.seed_order("2002", &[("Plate", 5), ("Nut", 5)]).await;
    let barcodes = app.barcodes(order_id).await;

    let response = app
        .post(
            "/api/receive",
            Role::OperatorLimited,
            json!({ "barcode": barcodes[0], "quantityReceived": 5 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data().get("qtyRemaining").is_none());

    let order = app.get(&format!("/api/orders/{}", order_id), Role::Viewer).await;
    assert_eq!(order.data()["status"], "partial");
}

#[tokio::test]
async fn receiving_an_unknown_barcode_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/receive",
            Role::Admin,
            json!({ "barcode": "MAT-000000-999", "quantityReceived": 1 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn move_and_consume_keep_stock_non_negative() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-MAIN").await;
    let order_id = app.seed_order("3001", &[("Plate", 10)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);

    app.post(
        "/api/receive",
        Role::OperatorLimited,
        json!({ "barcode": barcode, "quantityReceived": 10 }),
    )
    .await;

    let moved = app
        .post(
            "/api/inventory/move",
            Role::OperatorLimited,
            json!({ "barcode": barcode, "warehouseId": "WH-MAIN", "position": "A-01", "quantity": 10 }),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK, "{}", moved.raw);
    assert_eq!(moved.data()["qtyAvailable"], 10);

    let consumed = app
        .post(
            "/api/consume",
            Role::OperatorLimited,
            json!({ "barcode": barcode, "warehouseId": "WH-MAIN", "position": "A-01", "quantity": 3 }),
        )
        .await;
    assert_eq!(consumed.status, StatusCode::OK);
    assert_eq!(consumed.data()["qtyAvailable"], 7);

    let too_much = app
        .post(
            "/api/consume",
            Role::OperatorLimited,
            json!({ "barcode": barcode, "warehouseId": "WH-MAIN", "position": "A-01", "quantity": 8 }),
        )
        .await;
    assert_eq!(too_much.status, StatusCode::BAD_REQUEST);
    assert!(too_much.message().contains("Insufficient quantity"));

    let inventory = app
        .get(&format!("/api/inventory?barcode={}", barcode), Role::Viewer)
        .await;
    let rows = inventory.data().as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["qtyAvailable"], 7);
    assert_eq!(rows[0]["itemName"], "Plate");

    let movements = app
        .get(&format!("/api/movements/{}", barcode), Role::Viewer)
        .await;
    let kinds: Vec<&str> = movements
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["movementType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["consume", "move", "receive"]);
}

#[tokio::test]
async fn repeated_moves_to_one_position_share_a_row() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-UP").await;
    let order_id = app.seed_order("3101", &[("Plate", 10)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);
    let body = json!({ "barcode": barcode, "warehouseId": "WH-UP", "position": "U-1", "quantity": 4 });

    let first = app.post("/api/inventory/move", Role::OperatorLimited, body.clone()).await;
    assert_eq!(first.status, StatusCode::OK, "{}", first.raw);
    assert_eq!(first.data()["qtyAvailable"], 4);

    let second = app.post("/api/inventory/move", Role::OperatorLimited, body).await;
    assert_eq!(second.status, StatusCode::OK, "{}", second.raw);
    assert_eq!(second.data()["qtyAvailable"], 8);

    let rows = app
        .get(&format!("/api/inventory?barcode={}", barcode), Role::Viewer)
        .await;
    assert_eq!(rows.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn consuming_from_an_empty_position_is_not_found() {
    let app = TestApp::new().await;
    let order_id = app.seed_order("3002", &[("Plate", 1)]).await;
    let barcode = app.barcodes(order_id).await.remove(0);

    let response = app
        .post(
            "/api/consume",
            Role::Admin,
            json!({ "barcode": barcode, "warehouseId": "WH-X", "position": "Z-99", "quantity": 1 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn barcode_labels_are_served_on_both_paths() {
    let app = TestApp::new().await;
    let order_id = app.seed_order("4001", &[("Plate", 2), ("Nut", 3)]).await;

    for path in ["/api/orders/generate-barcodes", "/api/generate/barcodes"] {
        let response = app
            .post(path, Role::OperatorLimited, json!({ "orderId": order_id }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        let labels = response.data().as_array().unwrap();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1]["itemName"], "Nut");
        assert_eq!(labels[1]["quantity"], 3);
    }

    let missing = app
        .post(
            "/api/orders/generate-barcodes",
            Role::Admin,
            json!({ "orderId": 9999 }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_writes_are_role_gated() {
    let app = TestApp::new().await;
    let body = json!({ "sapNumber": "5001", "supplier": "Ferona", "items": [] });

    let anonymous = app
        .request(Method::POST, "/api/orders/create", Some(body.clone()), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let viewer = app.post("/api/orders/create", Role::Viewer, body.clone()).await;
    assert_eq!(viewer.status, StatusCode::FORBIDDEN);

    let limited = app.post("/api/orders/create", Role::OperatorLimited, body).await;
    assert_eq!(limited.status, StatusCode::CREATED);
}

#[tokio::test]
async fn non_numeric_ids_are_bad_requests() {
    let app = TestApp::new().await;
    let response = app.get("/api/orders/not-a-number", Role::Viewer).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}
