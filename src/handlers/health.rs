use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::error;

use crate::db::check_connection;
use crate::dto::dashboard::{DatabaseHealth, HealthReport};
use crate::errors::ServiceError;
use crate::handlers::AppState;

/// Liveness and database probe.
///
/// The report is returned bare, without the success envelope, so load
/// balancers can read `status` directly.
#[utoipa::path(
    get,
    path = "/api/health",
    summary = "Health check",
    responses(
        (status = 200, description = "Service and database are up", body = HealthReport),
        (status = 503, description = "Database unreachable", body = HealthReport),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let (status, database) = database_health(check_connection(&state.db).await);

    let report = HealthReport {
        status: if status.is_success() { "ok" } else { "error" }.to_string(),
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs(),
        environment: state.config.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        response_time: started.elapsed().as_millis() as u64,
    };

    (status, Json(report))
}

/// Driver errors are logged, never echoed to the caller.
fn database_health(probe: Result<Duration, ServiceError>) -> (StatusCode, DatabaseHealth) {
    match probe {
        Ok(elapsed) => (
            StatusCode::OK,
            DatabaseHealth {
                connected: true,
                response_time: Some(elapsed.as_millis() as u64),
                error: None,
            },
        ),
        Err(e) => {
            error!(error = %e, "Health check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                DatabaseHealth {
                    connected: false,
                    response_time: None,
                    error: Some("Database unavailable".to_string()),
                },
            )
        }
    }
}
