use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ensure_can_manage, ensure_percentage};
use crate::{
    AppState,
    auth::AuthUser,
    models::{
        AssessmentComponent, AssessmentType, CloAllocation, CreateAssessmentTypeRequest,
        CreateComponentRequest, CreateQuestionRequest, Question, SetCloAllocationRequest,
        UpdateComponentRequest,
    },
    response::{ApiError, ApiResponse, ApiResult},
};

/// ComponentFilter
///
/// Accepted query parameters for GET /api/assessments/components. The course
/// offering is mandatory; listing every component in the system has no use
/// case in the dashboard.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ComponentFilter {
    pub course_offering_id: Option<Uuid>,
}

// --- Assessment Types ---

/// list_assessment_types
///
/// [Authenticated Route] Lists the reusable assessment categories.
#[utoipa::path(
    get,
    path = "/api/assessments/types",
    responses((status = 200, description = "Types", body = [AssessmentType]))
)]
pub async fn list_assessment_types(
    _user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Vec<AssessmentType>> {
    let types = state.assessments.list_types().await?;
    Ok(ApiResponse::success(types))
}

/// create_assessment_type
///
/// [Faculty Route] Creates an assessment type.
#[utoipa::path(
    post,
    path = "/api/assessments/types",
    request_body = CreateAssessmentTypeRequest,
    responses((status = 201, description = "Created", body = AssessmentType))
)]
pub async fn create_assessment_type(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAssessmentTypeRequest>,
) -> ApiResult<AssessmentType> {
    ensure_can_manage(&user)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let created = state.assessments.create_type(&payload).await?;
    Ok(ApiResponse::created(created))
}

/// update_assessment_type
///
/// [Faculty Route] Renames/redescribes an assessment type.
#[utoipa::path(
    put,
    path = "/api/assessments/types/{id}",
    request_body = CreateAssessmentTypeRequest,
    responses(
        (status = 200, description = "Updated", body = AssessmentType),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_assessment_type(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAssessmentTypeRequest>,
) -> ApiResult<AssessmentType> {
    ensure_can_manage(&user)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let updated = state
        .assessments
        .update_type(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment type not found"))?;
    Ok(ApiResponse::success(updated))
}

/// delete_assessment_type
///
/// [Faculty Route] Deletes an assessment type unless components still
/// reference it (409 Conflict, the soft-dependency rule).
#[utoipa::path(
    delete,
    path = "/api/assessments/types/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Type is referenced by components")
    )
)]
pub async fn delete_assessment_type(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if state.assessments.type_in_use(id).await? {
        return Err(ApiError::conflict(
            "assessment type is in use by one or more components",
        ));
    }
    if state.assessments.delete_type(id).await? {
        Ok(ApiResponse::message("assessment type deleted"))
    } else {
        Err(ApiError::not_found("assessment type not found"))
    }
}

// --- Assessment Components ---

/// list_components
///
/// [Authenticated Route] Lists the components of one course offering.
#[utoipa::path(
    get,
    path = "/api/assessments/components",
    params(ComponentFilter),
    responses((status = 200, description = "Components", body = [AssessmentComponent]))
)]
pub async fn list_components(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<ComponentFilter>,
) -> ApiResult<Vec<AssessmentComponent>> {
    let offering = filter
        .course_offering_id
        .ok_or_else(|| ApiError::bad_request("course_offering_id is required"))?;
    let components = state.assessments.list_components(offering).await?;
    Ok(ApiResponse::success(components))
}

/// get_component
#[utoipa::path(
    get,
    path = "/api/assessments/components/{id}",
    responses(
        (status = 200, description = "Found", body = AssessmentComponent),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_component(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<AssessmentComponent> {
    let component = state
        .assessments
        .get_component(id)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    Ok(ApiResponse::success(component))
}

/// create_component
///
/// [Faculty Route] Creates a component; total marks must be positive and the
/// weight within [0, 100].
#[utoipa::path(
    post,
    path = "/api/assessments/components",
    request_body = CreateComponentRequest,
    responses(
        (status = 201, description = "Created", body = AssessmentComponent),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn create_component(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateComponentRequest>,
) -> ApiResult<AssessmentComponent> {
    ensure_can_manage(&user)?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    if payload.total_marks <= 0.0 {
        return Err(ApiError::bad_request("total_marks must be positive"));
    }
    ensure_percentage(payload.weight_percentage, "weight_percentage")?;

    let created = state.assessments.create_component(&payload).await?;
    Ok(ApiResponse::created(created))
}

/// update_component
///
/// [Faculty Route] Partial update of a component.
#[utoipa::path(
    put,
    path = "/api/assessments/components/{id}",
    request_body = UpdateComponentRequest,
    responses(
        (status = 200, description = "Updated", body = AssessmentComponent),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_component(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateComponentRequest>,
) -> ApiResult<AssessmentComponent> {
    ensure_can_manage(&user)?;
    if let Some(total) = payload.total_marks
        && total <= 0.0
    {
        return Err(ApiError::bad_request("total_marks must be positive"));
    }
    if let Some(weight) = payload.weight_percentage {
        ensure_percentage(weight, "weight_percentage")?;
    }
    let updated = state
        .assessments
        .update_component(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    Ok(ApiResponse::success(updated))
}

/// delete_component
#[utoipa::path(
    delete,
    path = "/api/assessments/components/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_component(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if state.assessments.delete_component(id).await? {
        Ok(ApiResponse::message("assessment component deleted"))
    } else {
        Err(ApiError::not_found("assessment component not found"))
    }
}

// --- CLO Allocations ---

/// list_clo_allocations
///
/// [Authenticated Route] How the component's marks are split across CLOs.
#[utoipa::path(
    get,
    path = "/api/assessments/components/{id}/clos",
    responses((status = 200, description = "Allocations", body = [CloAllocation]))
)]
pub async fn list_clo_allocations(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<CloAllocation>> {
    state
        .assessments
        .get_component(id)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    let allocations = state.assessments.clo_allocations(id).await?;
    Ok(ApiResponse::success(allocations))
}

/// set_clo_allocation
///
/// [Faculty Route] Allocates part of the component's marks to a CLO.
/// The allocation may not exceed the component's total marks.
#[utoipa::path(
    post,
    path = "/api/assessments/components/{id}/clos",
    request_body = SetCloAllocationRequest,
    responses(
        (status = 200, description = "Allocated"),
        (status = 400, description = "Allocation exceeds total marks"),
        (status = 404, description = "Component or CLO missing")
    )
)]
pub async fn set_clo_allocation(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetCloAllocationRequest>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    let component = state
        .assessments
        .get_component(id)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    state
        .outcomes
        .get_clo(payload.clo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;

    if payload.allocated_marks < 0.0 || payload.allocated_marks > component.total_marks {
        return Err(ApiError::bad_request(
            "allocated_marks must be between 0 and the component's total marks",
        ));
    }

    state
        .assessments
        .set_clo_allocation(id, payload.clo_id, payload.allocated_marks)
        .await?;
    Ok(ApiResponse::message("allocation saved"))
}

/// delete_clo_allocation
#[utoipa::path(
    delete,
    path = "/api/assessments/components/{id}/clos/{clo_id}",
    responses(
        (status = 200, description = "Removed"),
        (status = 404, description = "Allocation not found")
    )
)]
pub async fn delete_clo_allocation(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, clo_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if state.assessments.delete_clo_allocation(id, clo_id).await? {
        Ok(ApiResponse::message("allocation removed"))
    } else {
        Err(ApiError::not_found("allocation not found"))
    }
}

// --- Questions ---

/// list_questions
///
/// [Authenticated Route] The component's questions with CLO mapping.
#[utoipa::path(
    get,
    path = "/api/assessments/components/{id}/questions",
    responses((status = 200, description = "Questions", body = [Question]))
)]
pub async fn list_questions(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<Question>> {
    state
        .assessments
        .get_component(id)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    let questions = state.assessments.list_questions(id).await?;
    Ok(ApiResponse::success(questions))
}

/// create_question
///
/// [Faculty Route] Adds a question to the component, mapped to one CLO.
#[utoipa::path(
    post,
    path = "/api/assessments/components/{id}/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Created", body = Question),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Component or CLO missing")
    )
)]
pub async fn create_question(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateQuestionRequest>,
) -> ApiResult<Question> {
    ensure_can_manage(&user)?;
    if payload.max_marks <= 0.0 {
        return Err(ApiError::bad_request("max_marks must be positive"));
    }
    if payload.question_no < 1 {
        return Err(ApiError::bad_request("question_no must be positive"));
    }
    state
        .assessments
        .get_component(id)
        .await?
        .ok_or_else(|| ApiError::not_found("assessment component not found"))?;
    state
        .outcomes
        .get_clo(payload.clo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;

    let question = state.assessments.create_question(id, &payload).await?;
    Ok(ApiResponse::created(question))
}

/// delete_question
#[utoipa::path(
    delete,
    path = "/api/assessments/questions/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_question(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if state.assessments.delete_question(id).await? {
        Ok(ApiResponse::message("question deleted"))
    } else {
        Err(ApiError::not_found("question not found"))
    }
}
