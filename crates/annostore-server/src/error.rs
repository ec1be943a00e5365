//! API error types and the single error-to-response mapping.
//!
//! Every handler failure renders as `{"status": "failure", "reason": ...}`
//! with a status code owned by the error kind. The mapping lives in one
//! `IntoResponse` impl so the client-facing contract is uniform no matter
//! which endpoint raised the error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::schemas::ValidationError;

/// Fixed client-facing message for malformed or missing JSON bodies.
pub const PAYLOAD_ERROR_MESSAGE: &str = "Expected a valid JSON payload, but none was found!";

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body was missing or not valid JSON (400).
    #[error("{PAYLOAD_ERROR_MESSAGE}")]
    Payload,

    /// Payload failed schema validation (400). Carries the validator's
    /// message verbatim.
    #[error("{0}")]
    Validation(String),

    /// Not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Unauthorized (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Store error.
    #[error("storage error: {0}")]
    Store(#[from] annostore_store::StoreError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl ApiError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Payload | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Store(e) => match e {
                annostore_store::StoreError::AnnotationNotFound(_) => StatusCode::NOT_FOUND,
                annostore_store::StoreError::InvalidReference(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// JSON failure envelope, identical for every error kind.
#[derive(Debug, Serialize)]
pub struct FailureEnvelope {
    /// Always the literal `"failure"`.
    pub status: &'static str,
    /// Human-readable reason; never internal state or stack traces.
    pub reason: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server errors are logged with full detail but rendered with a
        // fixed reason: driver and SQL internals never reach the client.
        let reason = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = FailureEnvelope {
            status: "failure",
            reason,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn payload_error_message_is_fixed() {
        assert_eq!(
            ApiError::Payload.to_string(),
            "Expected a valid JSON payload, but none was found!"
        );
        assert_eq!(ApiError::Payload.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_error_carries_message_verbatim() {
        let err = ApiError::Validation("group may not be changed".into());
        assert_eq!(err.to_string(), "group may not be changed");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let err = ApiError::from(annostore_store::StoreError::AnnotationNotFound(Uuid::nil()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn dangling_reference_maps_to_400() {
        let err = ApiError::from(annostore_store::StoreError::InvalidReference(Uuid::nil()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_store_errors_map_to_500() {
        let err = ApiError::from(annostore_store::StoreError::Config("oops".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn server_error_reason_is_generic() {
        use http_body_util::BodyExt;

        let err = ApiError::from(annostore_store::StoreError::Config(
            "postgres://user:secret@db/annostore".into(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "failure");
        assert_eq!(body["reason"], "internal server error");
        assert!(!String::from_utf8_lossy(&bytes).contains("secret"));
    }

    #[tokio::test]
    async fn client_error_reason_is_verbatim() {
        use http_body_util::BodyExt;

        let response = ApiError::Validation("uri: 'uri' is a required property".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["reason"], "uri: 'uri' is a required property");
    }

    #[test]
    fn envelope_shape_is_uniform() {
        let body = FailureEnvelope {
            status: "failure",
            reason: "nope".into(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "failure", "reason": "nope"}));
    }
}
