//! HTTP error type and its response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lsriders_events::{ErrorKind, EventId, EventStoreError};
use serde::Serialize;

use crate::alerts;

// ── Error code constants ────────────────────────────────────────────

/// Malformed or illegal input.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
/// No principal on a request that needs one.
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
/// Event does not exist.
pub const NOT_FOUND: &str = "NOT_FOUND";
/// Storage or internal failure.
pub const STORAGE_FAILURE: &str = "STORAGE_FAILURE";

// ── Alert keys ──────────────────────────────────────────────────────

/// Create request carried an id.
pub const KEY_ID_EXISTS: &str = "idexists";
/// Update request carried no id.
pub const KEY_ID_NULL: &str = "idnull";
/// Any other rejected input.
pub const KEY_INVALID: &str = "invalid";

/// Error returned by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Rejected input (`400`).
    #[error("{message}")]
    BadRequest {
        /// Failure alert key (`error.{key}`).
        key: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Missing principal (`401`).
    #[error("{message}")]
    Unauthorized {
        /// Description.
        message: String,
    },

    /// Event does not exist (`404`).
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// Storage or worker failure (`500`).
    #[error("{message}")]
    Internal {
        /// Description.
        message: String,
    },
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// `400` with an explicit alert key.
    pub fn bad_request(key: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            key,
            message: message.into(),
        }
    }

    /// Machine-readable error code for this variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => INVALID_ARGUMENT,
            Self::Unauthorized { .. } => UNAUTHORIZED,
            Self::NotFound(_) => NOT_FOUND,
            Self::Internal { .. } => STORAGE_FAILURE,
        }
    }

    /// HTTP status for this variant.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Lowercase label used on the error metric.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => ErrorKind::InvalidArgument.as_str(),
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound(_) => ErrorKind::NotFound.as_str(),
            Self::Internal { .. } => ErrorKind::StorageFailure.as_str(),
        }
    }
}

impl From<EventStoreError> for ApiError {
    fn from(err: EventStoreError) -> Self {
        match err {
            EventStoreError::InvalidArgument(message) => Self::bad_request(KEY_INVALID, message),
            EventStoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

// Extractor rejections (bad JSON body, non-numeric id, malformed query)
// answer with the same `400` body and alert as any other invalid input.

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(KEY_INVALID, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(KEY_INVALID, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(KEY_INVALID, rejection.body_text())
    }
}

impl From<axum_extra::extract::QueryRejection> for ApiError {
    fn from(rejection: axum_extra::extract::QueryRejection) -> Self {
        Self::bad_request(KEY_INVALID, rejection.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let headers = match &self {
            Self::BadRequest { key, .. } => alerts::failure(key),
            _ => axum::http::HeaderMap::new(),
        };
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, headers, Json(body)).into_response()
    }
}
