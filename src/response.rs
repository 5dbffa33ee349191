use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// ApiResponse
///
/// Wrapper that serializes handler output into the standard response envelope:
/// `{ "success": true, "message"?, "data"? }`. Every successful handler in the
/// application returns this type (directly or via `ApiResult`), so clients can
/// rely on a single JSON shape across all endpoints.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with a data payload.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status: StatusCode::OK,
        }
    }

    /// 201 Created with the freshly inserted row as payload.
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            status: StatusCode::CREATED,
        }
    }

    /// Response with an explicit status, used by the bulk endpoints (207).
    pub fn with_status(data: T, status: StatusCode) -> Self {
        Self {
            data: Some(data),
            message: None,
            status,
        }
    }

    /// Attaches a human-readable message alongside the payload.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 200 OK carrying only a message (mutations with nothing useful to return).
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut body = serde_json::Map::new();
        body.insert("success".into(), json!(true));
        if let Some(message) = self.message {
            body.insert("message".into(), json!(message));
        }
        if let Some(data) = self.data {
            match serde_json::to_value(&data) {
                Ok(value) => {
                    body.insert("data".into(), value);
                }
                Err(e) => {
                    tracing::error!("failed to serialize response data: {}", e);
                    return ApiError::internal().into_response();
                }
            }
        }
        (self.status, Json(serde_json::Value::Object(body))).into_response()
    }
}

/// ApiError
///
/// Unified error type for all handlers, rendered as
/// `{ "success": false, "error": "..." }` with the mapped status code.
///
/// Unexpected/database errors are logged in full via `tracing` but the client
/// only ever sees the generic "internal server error" string, never the
/// underlying driver message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ApiError::not_found("resource not found"),
            other => {
                tracing::error!("database error: {:?}", other);
                ApiError::internal()
            }
        }
    }
}

/// Result alias used by every handler.
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
