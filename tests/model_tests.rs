use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use obe_portal::{
    models::{
        BulkOutcome, CourseLearningOutcome, RegisterRequest, SemesterResult, UpdateCloRequest,
        UpdateComponentRequest,
    },
    response::{ApiError, ApiResponse},
};
use serde_json::{Value, json};

async fn body_json(response: axum::response::Response) -> (StatusCode, Value) {
    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    (parts.status, serde_json::from_slice(&bytes).unwrap())
}

// --- Response Envelope ---

#[tokio::test]
async fn test_success_envelope_shape() {
    let response = ApiResponse::success(CourseLearningOutcome::default()).into_response();
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["data"].is_object());
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_created_envelope_carries_201() {
    let response = ApiResponse::created(SemesterResult::default()).into_response();
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn test_message_only_envelope_omits_data() {
    let response = ApiResponse::message("deleted").into_response();
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("deleted"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_error_envelope_shape() {
    let response = ApiError::conflict("clo_code already in use").into_response();
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("clo_code already in use"));
}

#[tokio::test]
async fn test_database_error_maps_to_generic_internal() {
    // Clients must never see driver detail, only the generic string.
    let err: ApiError = sqlx::Error::PoolTimedOut.into();
    let response = err.into_response();
    let (status, body) = body_json(response).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("internal server error"));
}

#[tokio::test]
async fn test_row_not_found_maps_to_404() {
    let err: ApiError = sqlx::Error::RowNotFound.into();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

// --- Partial Update Payloads ---

#[test]
fn test_update_clo_request_skips_unset_fields() {
    let empty = serde_json::to_value(UpdateCloRequest::default()).unwrap();
    assert_eq!(empty, json!({}));

    let partial = serde_json::to_value(UpdateCloRequest {
        description: Some("Revised outcome".to_string()),
        ..UpdateCloRequest::default()
    })
    .unwrap();
    assert_eq!(partial, json!({ "description": "Revised outcome" }));
}

#[test]
fn test_update_component_request_partial_deserialization() {
    // A client sending only the weight must not clobber the other fields.
    let req: UpdateComponentRequest =
        serde_json::from_value(json!({ "weight_percentage": 40.0 })).unwrap();
    assert_eq!(req.weight_percentage, Some(40.0));
    assert!(req.title.is_none());
    assert!(req.total_marks.is_none());
}

// --- Wire Payloads ---

#[test]
fn test_register_request_deserialization() {
    let req: RegisterRequest = serde_json::from_value(json!({
        "email": "s@uni.edu",
        "password": "secret-pass",
        "role": "student"
    }))
    .unwrap();
    assert_eq!(req.email, "s@uni.edu");
    assert_eq!(req.role, "student");
}

#[test]
fn test_bulk_outcome_serialization() {
    let outcome = BulkOutcome {
        saved: 3,
        failed: 1,
        errors: vec![obe_portal::models::BulkEntryError {
            index: 2,
            message: "marks_obtained must be between 0 and 20".to_string(),
        }],
    };
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["saved"], json!(3));
    assert_eq!(value["failed"], json!(1));
    assert_eq!(value["errors"][0]["index"], json!(2));
}
