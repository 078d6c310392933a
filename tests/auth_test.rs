mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use warehouse_api::auth::Role;

use common::{TestApp, PASSWORD};

async fn login(app: &TestApp, username: &str, password: &str) -> common::TestResponse {
    app.request(
        Method::POST,
        "/api/auth/login",
        Some(json!({ "username": username, "password": password })),
        None,
    )
    .await
}

#[tokio::test]
async fn login_issues_a_token_pair() {
    let app = TestApp::new().await;
    let response = login(&app, "viewer_user", PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.raw);
    assert_eq!(response.message(), "Login successful");

    let data = response.data();
    assert_eq!(data["tokenType"], "Bearer");
    assert!(data["accessToken"].as_str().unwrap().len() > 20);
    assert!(data["refreshToken"].is_string());
    assert_eq!(data["user"]["role"], "viewer");
    assert!(data["user"]["lastLogin"].is_string());
    assert!(data["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let app = TestApp::new().await;

    let wrong_password = login(&app, "viewer_user", "not-the-password").await;
    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.message(), "Invalid username or password");

    let unknown_user = login(&app, "nobody", PASSWORD).await;
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.message(), wrong_password.message());
}

#[tokio::test]
async fn garbage_bearer_tokens_are_unauthorized() {
    let app = TestApp::new().await;
    let response = app
        .request(Method::GET, "/api/orders", None, Some("not.a.jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn me_returns_the_caller() {
    let app = TestApp::new().await;
    let response = app.get("/api/auth/me", Role::OperatorLimited).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["username"], "operator_limited_user");
    assert_eq!(response.data()["role"], "operator_limited");

    let anonymous = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_until_logout_revokes_the_token() {
    let app = TestApp::new().await;
    let session = login(&app, "operator_user", PASSWORD).await;
    let access = session.data()["accessToken"].as_str().unwrap().to_string();
    let refresh = session.data()["refreshToken"].as_str().unwrap().to_string();

    let refreshed = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(refreshed.status, StatusCode::OK, "{}", refreshed.raw);
    let new_access = refreshed.data()["accessToken"].as_str().unwrap().to_string();

    let with_new = app
        .request(Method::GET, "/api/auth/me", None, Some(&new_access))
        .await;
    assert_eq!(with_new.status, StatusCode::OK);

    let logout = app
        .request(
            Method::POST,
            "/api/auth/logout",
            Some(json!({ "refreshToken": refresh })),
            Some(&access),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.message(), "Logged out");

    let after = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    let unknown = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            Some(json!({ "refreshToken": "made-up" })),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_only_revokes_the_callers_tokens() {
    let app = TestApp::new().await;
    let viewer = login(&app, "viewer_user", PASSWORD).await;
    let viewer_refresh = viewer.data()["refreshToken"].as_str().unwrap().to_string();

    app.request(
        Method::POST,
        "/api/auth/logout",
        Some(json!({ "refreshToken": viewer_refresh })),
        Some(app.token(Role::Admin)),
    )
    .await;

    let still_valid = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            Some(json!({ "refreshToken": viewer_refresh })),
            None,
        )
        .await;
    assert_eq!(still_valid.status, StatusCode::OK);
}

#[tokio::test]
async fn registration_is_admin_only() {
    let app = TestApp::new().await;
    let body = json!({
        "username": "new_operator",
        "email": "new.operator@example.com",
        "password": "Long-enough-secret1",
        "fullName": "New Operator"
    });

    let viewer = app.post("/api/auth/register", Role::Viewer, body.clone()).await;
    assert_eq!(viewer.status, StatusCode::FORBIDDEN);

    let anonymous = app
        .request(Method::POST, "/api/auth/register", Some(body.clone()), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let created = app.post("/api/auth/register", Role::Admin, body.clone()).await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.raw);
    assert_eq!(created.data()["role"], "operator");
    assert_eq!(created.data()["fullName"], "New Operator");

    let duplicate = app.post("/api/auth/register", Role::Admin, body).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let session = login(&app, "new_operator", "Long-enough-secret1").await;
    assert_eq!(session.status, StatusCode::OK);
}

#[tokio::test]
async fn registration_validates_fields() {
    let app = TestApp::new().await;
    let response = app
        .post(
            "/api/auth/register",
            Role::Admin,
            json!({ "username": "ab", "email": "not-an-email", "password": "short", "role": "viewer" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    for field in ["username", "email", "password"] {
        assert!(fields.contains(&field), "missing {field} in {fields:?}");
    }
}

#[tokio::test]
async fn registration_enforces_account_rules() {
    let app = TestApp::new().await;
    let cases = [
        ("username", json!({ "username": "bad name!", "email": "a@example.com", "password": "Warehouse42" })),
        ("password", json!({ "username": "good_name", "email": "a@example.com", "password": "alllowercase1" })),
        ("role", json!({ "username": "good_name", "email": "a@example.com", "password": "Warehouse42", "role": "operator_limited" })),
    ];
    for (field, body) in cases {
        let response = app.post("/api/auth/register", Role::Admin, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{field}: {}", response.raw);
        let fields: Vec<&str> = response.body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["field"].as_str())
            .collect();
        assert_eq!(fields, vec![field]);
    }

    let weak_change = app
        .request(
            Method::PUT,
            "/api/auth/change-password",
            Some(json!({ "oldPassword": PASSWORD, "newPassword": "alllowercase1" })),
            Some(app.token(Role::Operator)),
        )
        .await;
    assert_eq!(weak_change.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak_change.body["errors"][0]["field"], "newPassword");
}

#[tokio::test]
async fn changing_the_password_revokes_refresh_tokens() {
    let app = TestApp::new().await;
    let session = login(&app, "operator_user", PASSWORD).await;
    let refresh = session.data()["refreshToken"].as_str().unwrap().to_string();
    let access = session.data()["accessToken"].as_str().unwrap().to_string();

    let wrong_old = app
        .request(
            Method::PUT,
            "/api/auth/change-password",
            Some(json!({ "oldPassword": "guess", "newPassword": "Brand-new-secret2" })),
            Some(&access),
        )
        .await;
    assert_eq!(wrong_old.status, StatusCode::UNAUTHORIZED);

    let changed = app
        .request(
            Method::PUT,
            "/api/auth/change-password",
            Some(json!({ "oldPassword": PASSWORD, "newPassword": "Brand-new-secret2" })),
            Some(&access),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK, "{}", changed.raw);

    let stale = app
        .request(
            Method::POST,
            "/api/auth/refresh",
            Some(json!({ "refreshToken": refresh })),
            None,
        )
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    assert_eq!(login(&app, "operator_user", PASSWORD).await.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        login(&app, "operator_user", "Brand-new-secret2").await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn error_envelope_carries_request_metadata() {
    let app = TestApp::new().await;
    let response = login(&app, "viewer_user", "nope").await;
    let body: &Value = &response.body;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body["timestamp"].is_string());
    assert!(response.headers.contains_key("x-request-id"));
}
