use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::error::DeviceError;

/// API error types returned from handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Device unreachable: {0}")]
    DeviceUnreachable(String),

    #[error("Device rejected the request: {0}")]
    DeviceRejected(String),
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::DeviceUnreachable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::DeviceRejected(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::NotFound(_) => "NotFound",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::DeviceUnreachable(_) => "DeviceUnreachable",
            ApiError::DeviceRejected(_) => "DeviceRejected",
        }
    }
}

impl From<DeviceError> for ApiError {
    fn from(err: DeviceError) -> Self {
        match &err {
            DeviceError::UnknownParameter { .. } | DeviceError::UnknownStation { .. } => {
                ApiError::NotFound(err.to_string())
            }
            DeviceError::ReadOnlyMode => ApiError::Forbidden(err.to_string()),
            DeviceError::NotReadable { .. }
            | DeviceError::NotWritable { .. }
            | DeviceError::UnsupportedType { .. }
            | DeviceError::EncodingOverflow { .. }
            | DeviceError::StringOverflow { .. }
            | DeviceError::ShortResponse { .. } => ApiError::BadRequest(err.to_string()),
            DeviceError::Link(_) | DeviceError::Timeout(_) => {
                ApiError::DeviceUnreachable(err.to_string())
            }
            DeviceError::Protocol(_) => ApiError::DeviceRejected(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::DeviceUnreachable(_) | ApiError::DeviceRejected(_) => {
                tracing::warn!(error = %self, "device-side API failure");
            }
            _ => {
                tracing::debug!(error = %self, "client error");
            }
        }

        let body = ErrorResponse {
            error: self.error_type(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errors_map_to_status_codes() {
        let err: ApiError = DeviceError::ReadOnlyMode.into();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err: ApiError = DeviceError::UnknownParameter {
            class: crate::registers::DeviceClass::Plant,
            name: "x".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = DeviceError::Link("refused".into()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = DeviceError::Protocol("illegal function".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err: ApiError = DeviceError::NotWritable { address: 30014 }.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
