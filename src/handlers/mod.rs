pub mod webhook;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::health::{check_health, PostgresChecker, RedisChecker};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckOut {
    pub status: String,
    pub current_time: DateTime<Utc>,
}

/// Liveness probe. Always healthy while the process is serving.
pub async fn root_health() -> impl IntoResponse {
    Json(HealthCheckOut {
        status: "HEALTHY".to_string(),
        current_time: Utc::now(),
    })
}

/// Dependency-checked health report. Postgres is the critical dependency;
/// the endpoint returns 503 only when it is unreachable.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = check_health(
        PostgresChecker::new(state.db.clone()),
        RedisChecker::new(state.redis_url.clone()),
        state.start_time,
    )
    .await;

    let status_code = if report.status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(report))
}
