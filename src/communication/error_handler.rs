use crate::database::DatabaseError;
use crate::pricing::PricingError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;

/// Success envelope: `{ "data": ... }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self { data })
    }
}

/// Failure envelope: `{ "error": { "code": ..., "message": ... } }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    pub fn internal(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }

    pub fn from_pricing(code: &'static str, error: &PricingError) -> Self {
        match error {
            PricingError::Validation(message) => Self::bad_request(code, message.clone()),
            PricingError::Computation(_) => Self::internal(code, error.to_string()),
        }
    }

    pub fn from_database(code: &'static str, error: &DatabaseError) -> Self {
        Self::internal(code, error.to_string())
    }

    /// Malformed or non JSON request bodies are client errors
    pub fn from_rejection(code: &'static str, rejection: &JsonRejection) -> Self {
        Self::bad_request(code, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, message = %self.message, "Request failed");
        }

        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        });
        (self.status, Json(body)).into_response()
    }
}
