use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{AppState, auth::AuthUser, models::NewAuditLog, response::ApiError};

/// Responses above this size are recorded without a body snapshot.
const MAX_CAPTURED_BODY: usize = 64 * 1024;

/// Maps an HTTP method onto the audit vocabulary.
fn action_for(method: &Method) -> Option<&'static str> {
    match *method {
        Method::POST => Some("CREATE"),
        Method::PUT | Method::PATCH => Some("UPDATE"),
        Method::DELETE => Some("DELETE"),
        _ => None,
    }
}

/// The audited table is named by the first path segment after /api,
/// e.g. /api/clos/{id} -> "clos".
fn table_for(path: &str) -> Option<String> {
    path.strip_prefix("/api/")
        .and_then(|rest| rest.split('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// auto_audit
///
/// Response-layer middleware that records every successful mutation under
/// /api into the audit trail: who, which table, which record, and the
/// response payload. The insert runs on a detached task so audit storage
/// never adds latency to (or fails) the request itself.
pub async fn auto_audit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let (Some(action), Some(table_name)) = (action_for(&method), table_for(&path)) else {
        return next.run(req).await;
    };

    let user_id = req.extensions().get::<AuthUser>().map(|u| u.id);
    let ip_address = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').next().unwrap_or(v).trim().to_string());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let response = next.run(req).await;
    if !response.status().is_success() {
        return response;
    }

    // Buffer the body so the record id and payload can be captured, then
    // hand the same bytes back to the client. The client must always see
    // the full payload, so the buffer itself is unbounded; only the stored
    // snapshot is capped.
    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("response body unreadable during audit capture: {}", e);
            return ApiError::internal().into_response();
        }
    };

    let parsed: Option<serde_json::Value> = serde_json::from_slice(&bytes).ok();
    let record_id = parsed
        .as_ref()
        .and_then(|v| v.get("data"))
        .and_then(|d| d.get("id"))
        .and_then(|id| id.as_str())
        .map(str::to_string);
    let new_values = if bytes.len() <= MAX_CAPTURED_BODY {
        parsed
    } else {
        tracing::warn!(
            "audit snapshot skipped, response body of {} bytes exceeds the capture limit",
            bytes.len()
        );
        None
    };

    let log = NewAuditLog {
        user_id,
        action: action.to_string(),
        table_name,
        record_id,
        new_values,
        ip_address,
        user_agent,
    };
    let audit = state.audit.clone();
    tokio::spawn(async move {
        if let Err(e) = audit.insert(log).await {
            tracing::error!("failed to write audit log: {:?}", e);
        }
    });

    Response::from_parts(parts, Body::from(bytes))
}
