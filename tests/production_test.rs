mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use warehouse_api::auth::Role;

use common::TestApp;

#[tokio::test]
async fn starting_a_work_order_creates_pending_stages() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/production/start",
            Role::Operator,
            json!({
                "productCode": "FRAME-01",
                "quantityIn": 25,
                "batchNumber": "B-17",
                "stages": [
                    { "stageName": "Cutting", "machineId": "SAW-1" },
                    { "stageName": "Welding", "inputQuantity": 20 }
                ]
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.raw);
    assert_eq!(response.message(), "Production started");

    let data = response.data();
    assert_eq!(data["status"], "started");
    assert_eq!(data["operatorId"], "operator_user");
    let stages = data["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 2);
    assert!(stages.iter().all(|s| s["status"] == "pending"));
    assert_eq!(stages[0]["stageSequence"], 1);
    assert_eq!(stages[0]["inputQuantity"], 25);
    assert_eq!(stages[1]["stageSequence"], 2);
    assert_eq!(stages[1]["inputQuantity"], 20);
}

#[tokio::test]
async fn start_requires_a_positive_quantity() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/production/start",
            Role::Operator,
            json!({ "productCode": "FRAME-01", "quantityIn": 0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.body["errors"].as_array().expect("field errors");
    assert!(errors.iter().any(|e| e["field"] == "quantityIn"));
}

#[tokio::test]
async fn production_is_operator_only() {
    let app = TestApp::new().await;
    let body = json!({ "productCode": "FRAME-01", "quantityIn": 5 });

    let limited = app
        .post("/api/production/start", Role::OperatorLimited, body.clone())
        .await;
    assert_eq!(limited.status, StatusCode::FORBIDDEN);

    let viewer = app.post("/api/production/start", Role::Viewer, body).await;
    assert_eq!(viewer.status, StatusCode::FORBIDDEN);

    let (_, stages) = app.seed_production("FRAME-02", &["Cutting"]).await;
    let start = app
        .post(
            &format!("/api/production/stage/{}/start", stages[0]),
            Role::OperatorLimited,
            json!({}),
        )
        .await;
    assert_eq!(start.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn stages_walk_the_state_machine() {
    let app = TestApp::new().await;
    let (work_order_id, stages) = app.seed_production("FRAME-03", &["Cutting", "Welding"]).await;
    let stage = stages[0];

    let started = app
        .post(
            &format!("/api/production/stage/{}/start", stage),
            Role::Operator,
            json!({}),
        )
        .await;
    assert_eq!(started.status, StatusCode::OK, "{}", started.raw);
    assert_eq!(started.message(), "Stage started");
    assert_eq!(started.data()["status"], "started");
    assert!(started.data()["startTime"].is_string());

    let production = app
        .get(&format!("/api/production/{}", work_order_id), Role::Viewer)
        .await;
    assert_eq!(production.data()["production"]["status"], "in_progress");

    let paused = app
        .post(
            &format!("/api/production/stage/{}/pause", stage),
            Role::Operator,
            json!({ "notes": "Blade change" }),
        )
        .await;
    assert_eq!(paused.data()["status"], "paused");

    let resumed = app
        .post(
            &format!("/api/production/stage/{}/resume", stage),
            Role::Operator,
            json!({}),
        )
        .await;
    assert_eq!(resumed.message(), "Stage resumed");
    assert_eq!(resumed.data()["status"], "in_progress");

    let completed = app
        .post(
            &format!("/api/production/stage/{}/complete", stage),
            Role::Operator,
            json!({ "quantity": 9, "scrapQuantity": 1 }),
        )
        .await;
    assert_eq!(completed.status, StatusCode::OK);
    assert_eq!(completed.data()["status"], "completed");
    assert_eq!(completed.data()["outputQuantity"], 9);
    assert_eq!(completed.data()["scrapQuantity"], 1);
    assert!(completed.data()["endTime"].is_string());

    let logs = app
        .get(&format!("/api/production/stage/{}/logs", stage), Role::Viewer)
        .await;
    let events: Vec<&str> = logs
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["eventType"].as_str().unwrap())
        .collect();
    assert_eq!(events, vec!["completed", "resumed", "paused", "started"]);
}

#[tokio::test]
async fn illegal_transitions_leave_the_stage_alone() {
    let app = TestApp::new().await;
    let (_, stages) = app.seed_production("FRAME-04", &["Cutting"]).await;
    let stage = stages[0];

    let resume_pending = app
        .post(
            &format!("/api/production/stage/{}/resume", stage),
            Role::Operator,
            json!({}),
        )
        .await;
    assert_eq!(resume_pending.status, StatusCode::BAD_REQUEST);

    for action in ["start", "complete"] {
        let response = app
            .post(
                &format!("/api/production/stage/{}/{}", stage, action),
                Role::Operator,
                json!({}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{action}: {}", response.raw);
    }

    for action in ["start", "pause", "resume", "complete"] {
        let response = app
            .post(
                &format!("/api/production/stage/{}/{}", stage, action),
                Role::Operator,
                json!({}),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{action}");
    }

    let detail = app
        .get(&format!("/api/production/stage/{}", stage), Role::Viewer)
        .await;
    assert_eq!(detail.data()["stage"]["status"], "completed");
    assert_eq!(detail.data()["logs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn completing_every_stage_completes_the_work_order() {
    let app = TestApp::new().await;
    let (work_order_id, stages) = app.seed_production("FRAME-05", &["Cutting", "Welding"]).await;

    for (index, stage) in stages.iter().enumerate() {
        for action in ["start", "complete"] {
            app.post(
                &format!("/api/production/stage/{}/{}", stage, action),
                Role::Operator,
                json!({}),
            )
            .await;
        }

        let production = app
            .get(&format!("/api/production/{}", work_order_id), Role::Viewer)
            .await;
        let expected = if index + 1 == stages.len() {
            "completed"
        } else {
            "in_progress"
        };
        assert_eq!(production.data()["production"]["status"], expected);
    }

    let production = app
        .get(&format!("/api/production/{}", work_order_id), Role::Viewer)
        .await;
    let detail = production.data();
    assert!(detail["production"]["endTime"].is_string());
    assert_eq!(detail["stages"].as_array().unwrap().len(), 2);
    assert_eq!(detail["stageLogs"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn stage_actions_on_unknown_stages_are_not_found() {
    let app = TestApp::new().await;
    let response = app
        .post("/api/production/stage/4242/start", Role::Operator, json!({}))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let logs = app.get("/api/production/stage/4242/logs", Role::Viewer).await;
    assert_eq!(logs.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_requires_a_field_and_stamps_completion() {
    let app = TestApp::new().await;
    let (work_order_id, _) = app.seed_production("FRAME-06", &["Cutting"]).await;
    let uri = format!("/api/production/{}", work_order_id);

    let empty = app
        .request(Method::PUT, &uri, None, Some(app.token(Role::Operator)))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.message(), "Nothing to update");

    let updated = app
        .put(
            &uri,
            Role::Operator,
            json!({ "status": "completed", "quantityOut": 8, "quantityScrap": 2 }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{}", updated.raw);
    assert_eq!(updated.data()["status"], "completed");
    assert_eq!(updated.data()["quantityOut"], 8);
    assert!(updated.data()["endTime"].is_string());

    let missing = app
        .put("/api/production/999", Role::Operator, json!({ "notes": "x" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn production_list_filters_by_status() {
    let app = TestApp::new().await;
    let (_, stages) = app.seed_production("FRAME-07", &["Cutting"]).await;
    app.seed_production("FRAME-08", &["Cutting"]).await;
    app.post(
        &format!("/api/production/stage/{}/start", stages[0]),
        Role::Operator,
        json!({}),
    )
    .await;

    let all = app.get("/api/production", Role::Viewer).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["pagination"]["total"], 2);

    let running = app
        .get("/api/production?status=in_progress", Role::Viewer)
        .await;
    let rows = running.data().as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["productCode"], "FRAME-07");
    assert_eq!(rows[0]["totalOutput"], 0);

    let by_code = app
        .get("/api/production?productCode=FRAME-08", Role::Viewer)
        .await;
    assert_eq!(by_code.body["pagination"]["total"], 1);
}
