use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::device::EssDevice;
use crate::snapshot::CycleStats;
use crate::transport::ConnectionState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    connection: ConnectionState,
    cycles: CycleStats,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /api/v1/health
///
/// Reports the connection state and polling statistics. Always answers,
/// even while the plant is unreachable.
pub async fn health_check(State(device): State<EssDevice>) -> impl IntoResponse {
    let snapshot = device.snapshot().await;
    Json(HealthResponse {
        status: "ok",
        connection: device.connection_state(),
        cycles: snapshot.cycles,
        timestamp: chrono::Utc::now(),
    })
}
