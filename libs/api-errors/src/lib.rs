//! JSON envelope shared by the REST modules.
//!
//! Every response body carries `success`; failures always come back as
//! `{ "success": false, "message": "..." }` with the HTTP status as the only
//! machine-readable discriminator.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Message shown for every unhandled failure. Details only go to the log.
pub const INTERNAL_MESSAGE: &str = "Internal server error.";

/// Static error definition from a module's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub message: &'static str,
}

impl ErrDef {
    pub const fn new(status: u16, message: &'static str) -> Self {
        Self { status, message }
    }

    /// Convert this definition into a response-ready error.
    #[inline]
    pub fn to_error(&self) -> ApiError {
        ApiError::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.message,
        )
    }
}

pub const INVALID_REQUEST: ErrDef = ErrDef::new(400, "Invalid request.");
pub const ROUTE_NOT_FOUND: ErrDef = ErrDef::new(404, "Route not found.");
pub const METHOD_NOT_ALLOWED: ErrDef = ErrDef::new(405, "Method not allowed.");
pub const REQUEST_TIMEOUT: ErrDef = ErrDef::new(408, "Request timed out.");
pub const PAYLOAD_TOO_LARGE: ErrDef = ErrDef::new(413, "Request body too large.");

/// Body of message-only responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(title = "MessageBody")]
pub struct MessageBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MessageBody {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Successful message-only reply.
pub fn reply(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<MessageBody>) {
    (status, Json(MessageBody::ok(message)))
}

/// Failure that renders as `{success: false, message}`.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
    // Never sent to the client.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 with the generic message; `detail` is logged, not returned.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_MESSAGE.to_string(),
            detail: Some(detail.to_string()),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error = self.detail.as_deref().unwrap_or(&self.message),
                "request failed"
            );
        } else {
            tracing::warn!(
                status = self.status.as_u16(),
                error = %self.message,
                "request rejected"
            );
        }

        (self.status, Json(MessageBody::failed(self.message))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "malformed JSON body");
        INVALID_REQUEST.to_error()
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "malformed path parameter");
        INVALID_REQUEST.to_error()
    }
}
