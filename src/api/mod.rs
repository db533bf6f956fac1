pub mod error;
pub mod health;
pub mod parameter;
pub mod snapshot;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::device::EssDevice;

pub fn router(device: EssDevice) -> Router {
    Router::new()
        .route("/api/v1/health", get(health::health_check))
        .route("/api/v1/snapshot", get(snapshot::get_snapshot))
        .route("/api/v1/parameter", post(parameter::write_parameter))
        .route("/api/v1/reprobe", post(parameter::reprobe))
        .with_state(device)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(30))),
        )
}
