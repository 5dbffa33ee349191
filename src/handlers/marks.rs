use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::ensure_can_manage;
use crate::{
    AppState,
    auth::AuthUser,
    models::{
        BulkEntryError, BulkMarksRequest, BulkOutcome, BulkQuestionMarksRequest,
        CreateMarkRequest, CreateQuestionMarkRequest, StudentAssessmentMark, StudentQuestionMark,
    },
    response::{ApiError, ApiResponse, ApiResult},
};

/// Validates one component-level mark entry without persisting it. Returns the
/// message the bulk endpoint collects per rejected row.
async fn check_component_mark(state: &AppState, entry: &CreateMarkRequest) -> Result<(), String> {
    let component = state
        .assessments
        .get_component(entry.component_id)
        .await
        .map_err(|e| {
            tracing::error!("database error: {:?}", e);
            "internal server error".to_string()
        })?
        .ok_or_else(|| "assessment component not found".to_string())?;

    if entry.marks_obtained < 0.0 || entry.marks_obtained > component.total_marks {
        return Err(format!(
            "marks_obtained must be between 0 and {}",
            component.total_marks
        ));
    }
    Ok(())
}

async fn check_question_mark(
    state: &AppState,
    entry: &CreateQuestionMarkRequest,
) -> Result<(), String> {
    let question = state
        .assessments
        .get_question(entry.question_id)
        .await
        .map_err(|e| {
            tracing::error!("database error: {:?}", e);
            "internal server error".to_string()
        })?
        .ok_or_else(|| "question not found".to_string())?;

    if entry.marks_obtained < 0.0 || entry.marks_obtained > question.max_marks {
        return Err(format!(
            "marks_obtained must be between 0 and {}",
            question.max_marks
        ));
    }
    Ok(())
}

fn bulk_response(outcome: BulkOutcome) -> ApiResult<BulkOutcome> {
    let status = if outcome.failed == 0 {
        StatusCode::CREATED
    } else if outcome.saved == 0 {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok(ApiResponse::with_status(outcome, status))
}

/// create_mark
///
/// [Faculty Route] Records (or corrects) a student's total mark for one
/// assessment component. Marks are bounds-checked against the component's
/// total marks.
#[utoipa::path(
    post,
    path = "/api/marks",
    request_body = CreateMarkRequest,
    responses(
        (status = 201, description = "Saved", body = StudentAssessmentMark),
        (status = 400, description = "Marks out of range"),
        (status = 404, description = "Component not found")
    )
)]
pub async fn create_mark(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateMarkRequest>,
) -> ApiResult<StudentAssessmentMark> {
    ensure_can_manage(&user)?;
    let component = state
        .assessments
        .get_component(payload.component_id)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    if payload.marks_obtained < 0.0 || payload.marks_obtained > component.total_marks {
        return Err(ApiError::bad_request(format!(
            "marks_obtained must be between 0 and {}",
            component.total_marks
        )));
    }

    let saved = state.marks.upsert_component_mark(&payload).await?;
    Ok(ApiResponse::created(saved))
}

/// bulk_marks
///
/// [Faculty Route] Batch entry of component marks. Rows are validated and
/// saved independently: 201 when every row landed, 207 Multi-Status when some
/// failed, 400 when none did. The response body tallies both sides either way.
#[utoipa::path(
    post,
    path = "/api/marks/bulk",
    request_body = BulkMarksRequest,
    responses(
        (status = 201, description = "All rows saved", body = BulkOutcome),
        (status = 207, description = "Partial success", body = BulkOutcome),
        (status = 400, description = "No rows saved", body = BulkOutcome)
    )
)]
pub async fn bulk_marks(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BulkMarksRequest>,
) -> ApiResult<BulkOutcome> {
    ensure_can_manage(&user)?;
    if payload.entries.is_empty() {
        return Err(ApiError::bad_request("entries must not be empty"));
    }

    let mut outcome = BulkOutcome::default();
    for (index, entry) in payload.entries.iter().enumerate() {
        let result = match check_component_mark(&state, entry).await {
            Ok(()) => state
                .marks
                .upsert_component_mark(entry)
                .await
                .map(|_| ())
                .map_err(|e| {
                    tracing::error!("database error: {:?}", e);
                    "internal server error".to_string()
                }),
            Err(message) => Err(message),
        };
        match result {
            Ok(()) => outcome.saved += 1,
            Err(message) => {
                outcome.failed += 1;
                outcome.errors.push(BulkEntryError { index, message });
            }
        }
    }
    bulk_response(outcome)
}

/// component_marks
///
/// [Faculty Route] All recorded marks for one component. Students cannot see
/// their peers' rows, so this listing is staff-only.
#[utoipa::path(
    get,
    path = "/api/marks/components/{id}",
    responses((status = 200, description = "Marks", body = [StudentAssessmentMark]))
)]
pub async fn component_marks(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<StudentAssessmentMark>> {
    ensure_can_manage(&user)?;
    let marks = state.marks.marks_for_component(id).await?;
    Ok(ApiResponse::success(marks))
}

/// student_marks
///
/// [Authenticated Route] A student's component marks. Students may only fetch
/// their own; faculty and admins may fetch anyone's.
#[utoipa::path(
    get,
    path = "/api/marks/students/{id}",
    responses(
        (status = 200, description = "Marks", body = [StudentAssessmentMark]),
        (status = 403, description = "Students may only view their own marks")
    )
)]
pub async fn student_marks(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<StudentAssessmentMark>> {
    if !user.can_manage() && user.id != id {
        return Err(ApiError::forbidden("you may only view your own marks"));
    }
    let marks = state.marks.marks_for_student(id).await?;
    Ok(ApiResponse::success(marks))
}

/// create_question_mark
///
/// [Faculty Route] Records a student's mark on a single question, bounded by
/// the question's max marks. These rows drive CLO attainment.
#[utoipa::path(
    post,
    path = "/api/marks/questions",
    request_body = CreateQuestionMarkRequest,
    responses(
        (status = 201, description = "Saved", body = StudentQuestionMark),
        (status = 400, description = "Marks out of range"),
        (status = 404, description = "Question not found")
    )
)]
pub async fn create_question_mark(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionMarkRequest>,
) -> ApiResult<StudentQuestionMark> {
    ensure_can_manage(&user)?;
    let question = state
        .assessments
        .get_question(payload.question_id)
        .await?
        .ok_or_else(|| ApiError::not_found("question not found"))?;
    if payload.marks_obtained < 0.0 || payload.marks_obtained > question.max_marks {
        return Err(ApiError::bad_request(format!(
            "marks_obtained must be between 0 and {}",
            question.max_marks
        )));
    }

    let saved = state.marks.upsert_question_mark(&payload).await?;
    Ok(ApiResponse::created(saved))
}

/// bulk_question_marks
///
/// [Faculty Route] Batch entry of question marks with the same
/// per-row semantics as the component bulk endpoint.
#[utoipa::path(
    post,
    path = "/api/marks/questions/bulk",
    request_body = BulkQuestionMarksRequest,
    responses(
        (status = 201, description = "All rows saved", body = BulkOutcome),
        (status = 207, description = "Partial success", body = BulkOutcome),
        (status = 400, description = "No rows saved", body = BulkOutcome)
    )
)]
pub async fn bulk_question_marks(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<BulkQuestionMarksRequest>,
) -> ApiResult<BulkOutcome> {
    ensure_can_manage(&user)?;
    if payload.entries.is_empty() {
        return Err(ApiError::bad_request("entries must not be empty"));
    }

    let mut outcome = BulkOutcome::default();
    for (index, entry) in payload.entries.iter().enumerate() {
        let result = match check_question_mark(&state, entry).await {
            Ok(()) => state
                .marks
                .upsert_question_mark(entry)
                .await
                .map(|_| ())
                .map_err(|e| {
                    tracing::error!("database error: {:?}", e);
                    "internal server error".to_string()
                }),
            Err(message) => Err(message),
        };
        match result {
            Ok(()) => outcome.saved += 1,
            Err(message) => {
                outcome.failed += 1;
                outcome.errors.push(BulkEntryError { index, message });
            }
        }
    }
    bulk_response(outcome)
}

/// student_question_marks
///
/// [Authenticated Route] A student's question-level marks, self-only for
/// students.
#[utoipa::path(
    get,
    path = "/api/marks/questions/students/{id}",
    responses(
        (status = 200, description = "Marks", body = [StudentQuestionMark]),
        (status = 403, description = "Students may only view their own marks")
    )
)]
pub async fn student_question_marks(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<StudentQuestionMark>> {
    if !user.can_manage() && user.id != id {
        return Err(ApiError::forbidden("you may only view your own marks"));
    }
    let marks = state.marks.question_marks_for_student(id).await?;
    Ok(ApiResponse::success(marks))
}
