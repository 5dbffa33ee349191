use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use super::{ensure_admin, ensure_can_manage};
use crate::{
    AppState,
    auth::AuthUser,
    calc::{self, CreditedGrade},
    models::{
        CloAttainmentSummaryRow, ComputeSemesterResultRequest, CourseGradeRow, SemesterResult,
        StudentCloAttainmentRow,
    },
    response::{ApiError, ApiResponse, ApiResult},
};

fn credited_grades(rows: &[CourseGradeRow]) -> impl Iterator<Item = CreditedGrade> + '_ {
    rows.iter().map(|row| {
        let (_, grade_point) = calc::grade_for_percentage(row.final_percentage);
        CreditedGrade {
            credit_hours: row.credit_hours,
            grade_point,
        }
    })
}

/// compute_attainment
///
/// [Faculty Route] Recomputes CLO attainment for one course offering from its
/// question-level marks, replaces the derived rows and returns the fresh
/// per-CLO summary.
#[utoipa::path(
    post,
    path = "/api/attainment/compute/{course_offering_id}",
    responses(
        (status = 200, description = "Recomputed summary", body = [CloAttainmentSummaryRow]),
        (status = 403, description = "Faculty or admin only")
    )
)]
pub async fn compute_attainment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(course_offering_id): Path<Uuid>,
) -> ApiResult<Vec<CloAttainmentSummaryRow>> {
    ensure_can_manage(&user)?;

    let marks = state.results.clo_question_marks(course_offering_id).await?;
    let students = calc::student_clo_attainment(&marks);
    let summary = calc::clo_attainment_summary(&students);
    state
        .results
        .replace_attainment(course_offering_id, &students, &summary)
        .await?;

    tracing::info!(
        %course_offering_id,
        students = students.len(),
        clos = summary.len(),
        "recomputed CLO attainment"
    );

    let rows = state.results.summary_for_course(course_offering_id).await?;
    Ok(ApiResponse::success(rows))
}

/// course_attainment
///
/// [Authenticated Route] The stored per-CLO attainment summary of one course
/// offering, as of the last recomputation.
#[utoipa::path(
    get,
    path = "/api/attainment/courses/{course_offering_id}",
    responses((status = 200, description = "Summary", body = [CloAttainmentSummaryRow]))
)]
pub async fn course_attainment(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(course_offering_id): Path<Uuid>,
) -> ApiResult<Vec<CloAttainmentSummaryRow>> {
    let rows = state.results.summary_for_course(course_offering_id).await?;
    Ok(ApiResponse::success(rows))
}

/// student_attainment
///
/// [Authenticated Route] A student's per-CLO attainment rows across all
/// offerings. Self-only for students.
#[utoipa::path(
    get,
    path = "/api/attainment/students/{id}",
    responses(
        (status = 200, description = "Attainment", body = [StudentCloAttainmentRow]),
        (status = 403, description = "Students may only view their own attainment")
    )
)]
pub async fn student_attainment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<StudentCloAttainmentRow>> {
    if !user.can_manage() && user.id != id {
        return Err(ApiError::forbidden(
            "you may only view your own attainment",
        ));
    }
    let rows = state.results.attainment_for_student(id).await?;
    Ok(ApiResponse::success(rows))
}

/// compute_semester_result
///
/// [Admin Route] Computes SGPA (target semester) and CGPA (every semester up
/// to and including it) from the student's weighted course percentages and
/// upserts the result row, always unpublished.
#[utoipa::path(
    post,
    path = "/api/semester-results/compute",
    request_body = ComputeSemesterResultRequest,
    responses(
        (status = 200, description = "Computed result", body = SemesterResult),
        (status = 404, description = "No course marks for that semester")
    )
)]
pub async fn compute_semester_result(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ComputeSemesterResultRequest>,
) -> ApiResult<SemesterResult> {
    ensure_admin(&user)?;

    let semester_grades = state
        .results
        .semester_course_grades(payload.student_id, payload.semester_id)
        .await?;
    if semester_grades.is_empty() {
        return Err(ApiError::not_found(
            "no course marks recorded for this student in this semester",
        ));
    }
    let cumulative_grades = state
        .results
        .cumulative_course_grades(payload.student_id, payload.semester_id)
        .await?;

    let sgpa = calc::grade_point_average(credited_grades(&semester_grades));
    let cgpa = calc::grade_point_average(credited_grades(&cumulative_grades));
    let total_credit_hours = semester_grades.iter().map(|g| g.credit_hours).sum();

    let result = state
        .results
        .upsert_semester_result(
            payload.student_id,
            payload.semester_id,
            sgpa,
            cgpa,
            total_credit_hours,
        )
        .await?;
    Ok(ApiResponse::success(result))
}

/// student_results
///
/// [Authenticated Route] A student's semester results. Students see only their
/// own published rows; faculty and admins see all rows of any student.
#[utoipa::path(
    get,
    path = "/api/semester-results/students/{id}",
    responses(
        (status = 200, description = "Results", body = [SemesterResult]),
        (status = 403, description = "Students may only view their own results")
    )
)]
pub async fn student_results(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<SemesterResult>> {
    let published_only = !user.can_manage();
    if published_only && user.id != id {
        return Err(ApiError::forbidden("you may only view your own results"));
    }
    let results = state.results.results_for_student(id, published_only).await?;
    Ok(ApiResponse::success(results))
}

/// publish_result
///
/// [Admin Route] Makes a semester result visible to its student.
#[utoipa::path(
    put,
    path = "/api/semester-results/{id}/publish",
    responses(
        (status = 200, description = "Published", body = SemesterResult),
        (status = 404, description = "Not Found")
    )
)]
pub async fn publish_result(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SemesterResult> {
    ensure_admin(&user)?;
    let result = state
        .results
        .set_published(id, true)
        .await?
        .ok_or_else(|| ApiError::not_found("semester result not found"))?;
    Ok(ApiResponse::success(result))
}

/// unpublish_result
///
/// [Admin Route] Hides a semester result from its student again.
#[utoipa::path(
    put,
    path = "/api/semester-results/{id}/unpublish",
    responses(
        (status = 200, description = "Unpublished", body = SemesterResult),
        (status = 404, description = "Not Found")
    )
)]
pub async fn unpublish_result(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SemesterResult> {
    ensure_admin(&user)?;
    let result = state
        .results
        .set_published(id, false)
        .await?
        .ok_or_else(|| ApiError::not_found("semester result not found"))?;
    Ok(ApiResponse::success(result))
}
