use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Every way a request can fail. Each variant owns its status code and
/// message; anything unexpected goes through `Internal`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Endpoint not found.")]
    EndpointNotFound,
    #[error("Method not allowed.")]
    MethodNotAllowed,
    #[error("No uuid specified.")]
    MissingIdentifier,
    #[error("User ID is not valid UUID.")]
    InvalidIdentifier,
    #[error("{}", malformed_body_message(.0))]
    MalformedBody(String),
    #[error("{}", missing_fields_message(.0))]
    MissingFields(Vec<String>),
    #[error("User with {0} UUID not found.")]
    UserNotFound(Uuid),
    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EndpointNotFound | ApiError::UserNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::MissingIdentifier
            | ApiError::InvalidIdentifier
            | ApiError::MalformedBody(_)
            | ApiError::MissingFields(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::EndpointNotFound => "EndpointNotFound",
            ApiError::MethodNotAllowed => "MethodNotAllowed",
            ApiError::MissingIdentifier => "MissingIdentifier",
            ApiError::InvalidIdentifier => "InvalidIdentifier",
            ApiError::MalformedBody(_) => "MalformedBody",
            ApiError::MissingFields(_) => "MissingFields",
            ApiError::UserNotFound(_) => "UserNotFound",
            ApiError::Internal(_) => "InternalError",
        }
    }

    fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        }
    }
}

fn malformed_body_message(detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        "Error while parsing request body.".to_string()
    } else {
        format!("Error while parsing request body. {detail}")
    }
}

fn missing_fields_message(fields: &[String]) -> String {
    let plural = if fields.len() > 1 { "s" } else { "" };
    let quoted = fields
        .iter()
        .map(|f| format!("\"{f}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("Missed required field{plural} {quoted}!")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(e) => error!(error = ?e, "request failed"),
            other => warn!(%status, kind = other.kind(), message = %other, "request rejected"),
        }
        (status, Json(self.body())).into_response()
    }
}

/// Turns a handler panic into the generic 500 so the connection still gets
/// exactly one well-formed response.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
