use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::Validate;

use super::error::ApiError;
use crate::codec::Value;
use crate::device::EssDevice;
use crate::registers::DeviceClass;

#[derive(Debug, Deserialize, Validate)]
pub struct WriteParameterRequest {
    pub device_class: DeviceClass,
    #[validate(range(min = 1, max = 247))]
    pub station: u8,
    pub field: String,
    pub value: Value,
}

/// POST /api/v1/parameter
///
/// Encode and write one parameter. Failures map to the usual codes:
/// unknown field or station 404, non-writable or out-of-range value 400,
/// read-only mode 403, unreachable plant 503.
pub async fn write_parameter(
    State(device): State<EssDevice>,
    Json(req): Json<WriteParameterRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    device
        .write_parameter(req.device_class, req.station, &req.field, req.value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReprobeRequest {
    pub device_class: DeviceClass,
    #[validate(range(min = 1, max = 247))]
    pub station: u8,
}

/// POST /api/v1/reprobe
///
/// Re-arm support probing for one station; the next polling cycle runs a
/// fresh discovery pass.
pub async fn reprobe(
    State(device): State<EssDevice>,
    Json(req): Json<ReprobeRequest>,
) -> Result<StatusCode, ApiError> {
    req.validate()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    device.reprobe(req.device_class, req.station)?;
    Ok(StatusCode::ACCEPTED)
}
