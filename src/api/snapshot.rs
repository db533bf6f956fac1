use axum::{extract::State, Json};

use crate::device::EssDevice;
use crate::snapshot::Snapshot;

/// GET /api/v1/snapshot
///
/// Full copy of the current fleet snapshot: the last merged state, even if
/// the most recent cycle failed. Never blocks on device I/O.
pub async fn get_snapshot(State(device): State<EssDevice>) -> Json<Snapshot> {
    Json(device.snapshot().await)
}
