mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use warehouse_api::auth::Role;

use common::TestApp;

#[tokio::test]
async fn sub_products_default_their_unit_and_status() {
    let app = TestApp::new().await;
    let (work_order_id, stages) = app.seed_production("FRAME-10", &["Cutting"]).await;

    let created = app
        .post(
            "/api/subproducts",
            Role::Operator,
            json!({
                "parentWorkOrderId": work_order_id,
                "parentStageId": stages[0],
                "componentCode": "RAIL-L",
                "quantity": 4
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.raw);
    let data = created.data();
    assert_eq!(data["unit"], "ks");
    assert_eq!(data["status"], "created");
    assert_eq!(data["componentName"], "RAIL-L");

    let by_work_order = app
        .get(
            &format!("/api/subproducts/work-order/{}", work_order_id),
            Role::Viewer,
        )
        .await;
    let rows = by_work_order.data().as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["componentCode"], "RAIL-L");

    let nested = app
        .get(
            &format!("/api/production/{}/subproducts", work_order_id),
            Role::Viewer,
        )
        .await;
    assert_eq!(nested.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn sub_products_need_an_existing_work_order() {
    let app = TestApp::new().await;

    let unknown = app
        .post(
            "/api/subproducts",
            Role::Operator,
            json!({ "parentWorkOrderId": 999, "componentCode": "RAIL-L" }),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let missing = app
        .post(
            "/api/subproducts",
            Role::Operator,
            json!({ "componentCode": "RAIL-L" }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sub_products_move_between_locations() {
    let app = TestApp::new().await;
    app.seed_warehouse("WH-WIP").await;
    let (work_order_id, _) = app.seed_production("FRAME-11", &["Cutting"]).await;

    let created = app
        .post(
            "/api/subproducts",
            Role::Operator,
            json!({ "parentWorkOrderId": work_order_id, "componentCode": "RAIL-R" }),
        )
        .await;
    let id = created.data()["subProductId"].as_i64().unwrap();
    let uri = format!("/api/subproducts/{}/move", id);

    let empty = app
        .request(Method::POST, &uri, None, Some(app.token(Role::Operator)))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.message(), "Nothing to move");

    let moved = app
        .post(
            &uri,
            Role::Operator,
            json!({ "warehouseId": "WH-WIP", "position": "W-3", "status": "in_stock" }),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK, "{}", moved.raw);
    assert_eq!(moved.data()["warehouseId"], "WH-WIP");
    assert_eq!(moved.data()["status"], "in_stock");

    let detail = app
        .get(&format!("/api/subproducts/{}", id), Role::Viewer)
        .await;
    assert_eq!(detail.data()["position"], "W-3");
    assert_eq!(detail.data()["warehouseName"], "Hall WH-WIP");

    let listed = app
        .get("/api/subproducts?status=in_stock", Role::Viewer)
        .await;
    assert_eq!(listed.body["pagination"]["total"], 1);

    let missing = app
        .post("/api/subproducts/999/move", Role::Operator, json!({ "position": "X" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quality_checks_bump_stage_counters() {
    let app = TestApp::new().await;
    let (work_order_id, stages) = app.seed_production("FRAME-12", &["Welding"]).await;
    let stage = stages[0];

    for result in ["OK", "OK", "NOK"] {
        let created = app
            .post(
                "/api/quality-checks",
                Role::Operator,
                json!({
                    "stageId": stage,
                    "checkType": "visual",
                    "result": result,
                    "parameter": "seam",
                    "measured": 4.2
                }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.raw);
        assert_eq!(created.data()["checkedBy"], "operator_user");
    }

    let detail = app
        .get(&format!("/api/production/stage/{}", stage), Role::Viewer)
        .await;
    assert_eq!(detail.data()["stage"]["qualityOk"], 2);
    assert_eq!(detail.data()["stage"]["qualityNok"], 1);
    assert_eq!(detail.data()["qualityChecks"].as_array().unwrap().len(), 3);

    let by_stage = app
        .get(&format!("/api/quality-checks/stage/{}", stage), Role::Viewer)
        .await;
    let rows = by_stage.data().as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["stageName"] == "Welding"));

    let failed = app.get("/api/quality-checks?result=NOK", Role::Viewer).await;
    assert_eq!(failed.body["pagination"]["total"], 1);

    let production = app
        .get(&format!("/api/production/{}", work_order_id), Role::Viewer)
        .await;
    let quality = production.data()["quality"].as_array().unwrap();
    assert_eq!(quality.len(), 2);
    assert_eq!(quality[0]["result"], "NOK");
    assert_eq!(quality[0]["count"], 1);
    assert_eq!(quality[1]["result"], "OK");
    assert_eq!(quality[1]["count"], 2);
}

#[tokio::test]
async fn quality_check_on_unknown_stage_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/quality-checks",
            Role::Operator,
            json!({ "stageId": 4242, "result": "OK" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quality_check_updates_keep_counters() {
    let app = TestApp::new().await;
    let (_, stages) = app.seed_production("FRAME-13", &["Painting"]).await;
    let created = app
        .post(
            "/api/quality-checks",
            Role::Operator,
            json!({ "stageId": stages[0], "result": "NOK" }),
        )
        .await;
    let check_id = created.data()["checkId"].as_i64().unwrap();
    let uri = format!("/api/quality-checks/{}", check_id);

    let empty = app
        .request(Method::PUT, &uri, None, Some(app.token(Role::Operator)))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let updated = app
        .put(&uri, Role::Operator, json!({ "result": "OK", "notes": "Re-measured" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.raw);
    assert_eq!(updated.data()["result"], "OK");

    let detail = app
        .get(&format!("/api/production/stage/{}", stages[0]), Role::Viewer)
        .await;
    assert_eq!(detail.data()["stage"]["qualityOk"], 0);
    assert_eq!(detail.data()["stage"]["qualityNok"], 1);

    let limited = app
        .put(&uri, Role::OperatorLimited, json!({ "notes": "x" }))
        .await;
    assert_eq!(limited.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn quality_report_groups_by_stage_and_product() {
    let app = TestApp::new().await;
    let (_, first) = app.seed_production("FRAME-14", &["Cutting"]).await;
    let (_, second) = app.seed_production("FRAME-15", &["Cutting"]).await;
    for (stage, result) in [(first[0], "OK"), (second[0], "OK"), (second[0], "NOK")] {
        app.post(
            "/api/quality-checks",
            Role::Operator,
            json!({ "stageId": stage, "result": result }),
        )
        .await;
    }

    let report = app.get("/api/quality-checks/report", Role::Viewer).await;
    assert_eq!(report.status, StatusCode::OK);
    let summary = report.data()["summary"].as_array().unwrap();
    let ok = summary
        .iter()
        .find(|row| row["stageName"] == "Cutting" && row["result"] == "OK")
        .expect("cutting OK row");
    assert_eq!(ok["count"], 2);

    let by_product = report.data()["byProduct"].as_array().unwrap();
    assert_eq!(by_product.len(), 3);
    assert!(by_product
        .iter()
        .any(|row| row["productCode"] == "FRAME-15" && row["result"] == "NOK"));
}

#[tokio::test]
async fn assembly_inspection_approves_or_rejects() {
    let app = TestApp::new().await;
    let order_id = app.seed_order("8001", &[("Frame", 1)]).await;
    let uri = format!("/api/quality/{}", order_id);

    let approved = app
        .post(&uri, Role::Operator, json!({ "result": "OK", "notes": "Fits" }))
        .await;
    assert_eq!(approved.status, StatusCode::OK, "{}", approved.raw);
    assert_eq!(approved.message(), "Quality check completed");
    assert_eq!(approved.data()["result"], "approved");

    let rejected = app
        .post(
            &uri,
            Role::Operator,
            json!({ "result": "NOK", "inspector": "QA-7", "parameters": { "gap": 0.4 } }),
        )
        .await;
    assert_eq!(rejected.data()["result"], "rejected");

    let rework = app
        .post(&uri, Role::Operator, json!({ "result": "rework" }))
        .await;
    assert_eq!(rework.status, StatusCode::BAD_REQUEST);

    let history = app
        .get(&format!("/api/quality/{}/history", order_id), Role::Viewer)
        .await;
    let rows = history.data().as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["result"], "NOK");
    assert_eq!(rows[0]["inspector"], "QA-7");
    assert_eq!(rows[1]["inspector"], "operator_user");

    let unknown = app
        .post("/api/quality/999", Role::Operator, json!({ "result": "OK" }))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let unknown_history = app.get("/api/quality/999/history", Role::Viewer).await;
    assert_eq!(unknown_history.status, StatusCode::NOT_FOUND);
}
