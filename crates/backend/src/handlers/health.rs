use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::shared::data::db;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn liveness() -> &'static str {
    "ok"
}

/// GET /api/health
pub async fn readiness() -> (StatusCode, Json<HealthStatus>) {
    let version = env!("CARGO_PKG_VERSION");
    match db::ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok",
                database: "ok",
                version,
            }),
        ),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "degraded",
                    database: "unavailable",
                    version,
                }),
            )
        }
    }
}
