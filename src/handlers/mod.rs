pub mod auth;
pub mod events;
pub mod payments;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Machine-readable error codes carried in every error envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    InvalidCredentials,
    TenantRequired,
    TenantAccessDenied,
    InvalidRequestBody,
    ValidationError,
    EventNameRequired,
    EventLocationRequired,
    EventStartDateRequired,
    EventEndDateRequired,
    EventInvalidDate,
    EventInvalidDateRange,
    EventInvalidCapacity,
    EventInvalidStatus,
    EventNotFound,
    EventActiveDeleteForbidden,
    EventHasPayments,
    InvalidQuery,
    NotFound,
    InternalError,
}

/// Success envelope: `{ success: true, data }` or `{ success: true, message }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response helper: 200 OK with data
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        message: None,
    })
}

/// Response helper: 201 Created with data
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

/// Response helper: success without payload
pub fn message(msg: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(msg.into()),
    })
}

/// Error envelope: `{ success: false, code, message? }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: ErrorCode,
    message: Option<String>,
}

impl ApiError {
    fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: Some(message.into()),
        }
    }

    pub fn bad_request(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, msg)
    }

    pub fn not_found(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, msg)
    }

    /// State conflicts are reported as 400 Bad Request
    pub fn conflict(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, msg)
    }

    pub fn unauthorized(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

    pub fn forbidden(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, code, msg)
    }

    /// Opaque 500; details belong in the server log only
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError,
            "Internal server error",
        )
    }

    pub fn event_not_found() -> Self {
        Self::not_found(ErrorCode::EventNotFound, "Event not found")
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Check for typed NotFoundError first (no fragile string matching)
        if let Some(nf) = err.downcast_ref::<crate::db::NotFoundError>() {
            return match nf.resource.as_str() {
                "Event" => Self::event_not_found(),
                _ => Self::not_found(ErrorCode::NotFound, format!("{} not found", nf.resource)),
            };
        }
        if let Some(in_use) = err.downcast_ref::<crate::db::InUseError>() {
            return match in_use.resource.as_str() {
                "Event" => Self::conflict(
                    ErrorCode::EventHasPayments,
                    "Cannot delete an event that has payments",
                ),
                _ => Self::conflict(
                    ErrorCode::ValidationError,
                    format!("{} is still in use", in_use.resource),
                ),
            };
        }
        tracing::error!(error = ?err, "request failed");
        Self::internal()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(ErrorCode::InvalidRequestBody, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(ErrorCode::InvalidQuery, rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the error envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Healthcheck endpoint, always 200 OK
pub async fn healthcheck() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "venue-events",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
