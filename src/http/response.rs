//! Error responses.
//!
//! # Design Decisions
//! - Every error body is JSON: `{"error": "..."}`
//! - Classification timeout maps to 504 Gateway Timeout
//! - A filter lost mid-call maps to 500
//! - A handler panic maps to 500 with the same JSON shape

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::any::Any;

use crate::dispatcher::ClassifyError;

/// An error rendered as a JSON response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ClassifyError> for ApiError {
    fn from(err: ClassifyError) -> Self {
        let status = match err {
            ClassifyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ClassifyError::FilterLost { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Turn a caught handler panic into a 500.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
}
