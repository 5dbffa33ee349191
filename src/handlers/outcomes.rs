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
    calc,
    models::{
        CourseLearningOutcome, CreateCloRequest, CreatePloRequest, MapCloToPloRequest,
        MapPloToPeoRequest, MappedPeo, MappedPlo, PloAttainment, ProgramLearningOutcome,
        UpdateCloRequest, UpdatePloRequest, VALID_CORRELATION_LEVELS,
    },
    response::{ApiError, ApiResponse, ApiResult},
};

// --- Filter Structs ---

/// CloFilter
///
/// Accepted query parameters for GET /api/clos.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CloFilter {
    /// Restrict the listing to one course.
    pub course_id: Option<Uuid>,
}

/// PloFilter
///
/// Accepted query parameters for GET /api/plos.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PloFilter {
    /// Restrict the listing to one degree program.
    pub degree_id: Option<Uuid>,
}

fn validate_clo_create(req: &CreateCloRequest) -> Result<(), ApiError> {
    if req.clo_code.trim().is_empty() {
        return Err(ApiError::bad_request("clo_code is required"));
    }
    if req.description.trim().is_empty() {
        return Err(ApiError::bad_request("description is required"));
    }
    ensure_percentage(req.weight_percentage, "weight_percentage")?;
    ensure_percentage(req.target_attainment, "target_attainment")?;
    Ok(())
}

// --- CLO Handlers ---

/// list_clos
///
/// [Authenticated Route] Lists CLOs, optionally filtered by course.
#[utoipa::path(
    get,
    path = "/api/clos",
    params(CloFilter),
    responses((status = 200, description = "CLOs", body = [CourseLearningOutcome]))
)]
pub async fn list_clos(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<CloFilter>,
) -> ApiResult<Vec<CourseLearningOutcome>> {
    let clos = state.outcomes.list_clos(filter.course_id).await?;
    Ok(ApiResponse::success(clos))
}

/// get_clo
///
/// [Authenticated Route] Retrieves one CLO by id.
#[utoipa::path(
    get,
    path = "/api/clos/{id}",
    params(("id" = Uuid, Path, description = "CLO ID")),
    responses(
        (status = 200, description = "Found", body = CourseLearningOutcome),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_clo(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CourseLearningOutcome> {
    let clo = state
        .outcomes
        .get_clo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;
    Ok(ApiResponse::success(clo))
}

/// create_clo
///
/// [Faculty Route] Creates a CLO. Enforces the percentage bounds and the
/// per-course clo_code uniqueness invariant (409 on duplicates).
#[utoipa::path(
    post,
    path = "/api/clos",
    request_body = CreateCloRequest,
    responses(
        (status = 201, description = "Created", body = CourseLearningOutcome),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Duplicate clo_code")
    )
)]
pub async fn create_clo(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCloRequest>,
) -> ApiResult<CourseLearningOutcome> {
    ensure_can_manage(&user)?;
    validate_clo_create(&payload)?;

    if state
        .outcomes
        .clo_code_in_use(payload.course_id, &payload.clo_code, None)
        .await?
    {
        return Err(ApiError::conflict("clo_code already exists for this course"));
    }

    let clo = state.outcomes.create_clo(&payload).await?;
    Ok(ApiResponse::created(clo))
}

/// update_clo
///
/// [Faculty Route] Partial update; only the provided fields change.
#[utoipa::path(
    put,
    path = "/api/clos/{id}",
    request_body = UpdateCloRequest,
    responses(
        (status = 200, description = "Updated", body = CourseLearningOutcome),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_clo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCloRequest>,
) -> ApiResult<CourseLearningOutcome> {
    ensure_can_manage(&user)?;
    if let Some(weight) = payload.weight_percentage {
        ensure_percentage(weight, "weight_percentage")?;
    }
    if let Some(target) = payload.target_attainment {
        ensure_percentage(target, "target_attainment")?;
    }

    // The uniqueness check needs the course, so resolve the row first; this
    // also gives the 404 before any conflict answer.
    let existing = state
        .outcomes
        .get_clo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;

    if let Some(code) = &payload.clo_code {
        if code.trim().is_empty() {
            return Err(ApiError::bad_request("clo_code cannot be empty"));
        }
        if state
            .outcomes
            .clo_code_in_use(existing.course_id, code, Some(id))
            .await?
        {
            return Err(ApiError::conflict("clo_code already exists for this course"));
        }
    }

    let clo = state
        .outcomes
        .update_clo(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;
    Ok(ApiResponse::success(clo))
}

/// delete_clo
///
/// [Faculty Route] Deletes a CLO and (via FK cascade) its mappings.
#[utoipa::path(
    delete,
    path = "/api/clos/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_clo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if state.outcomes.delete_clo(id).await? {
        Ok(ApiResponse::message("CLO deleted"))
    } else {
        Err(ApiError::not_found("CLO not found"))
    }
}

/// get_clo_plos
///
/// [Authenticated Route] PLOs mapped to the CLO, with their mapping levels.
#[utoipa::path(
    get,
    path = "/api/clos/{id}/plos",
    responses((status = 200, description = "Mapped PLOs", body = [MappedPlo]))
)]
pub async fn get_clo_plos(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MappedPlo>> {
    state
        .outcomes
        .get_clo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;
    let plos = state.outcomes.plos_for_clo(id).await?;
    Ok(ApiResponse::success(plos))
}

/// map_clo_to_plo
///
/// [Faculty Route] Maps a CLO onto a PLO with a 1-3 mapping level.
/// Re-mapping an existing pair overwrites the level.
#[utoipa::path(
    post,
    path = "/api/clos/{id}/plos",
    request_body = MapCloToPloRequest,
    responses(
        (status = 200, description = "Mapped"),
        (status = 400, description = "Invalid mapping level"),
        (status = 404, description = "CLO or PLO missing")
    )
)]
pub async fn map_clo_to_plo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MapCloToPloRequest>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if !(1..=3).contains(&payload.mapping_level) {
        return Err(ApiError::bad_request("mapping_level must be 1, 2 or 3"));
    }
    state
        .outcomes
        .get_clo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("CLO not found"))?;
    state
        .outcomes
        .get_plo(payload.plo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("PLO not found"))?;

    state
        .outcomes
        .map_clo_plo(id, payload.plo_id, payload.mapping_level)
        .await?;
    Ok(ApiResponse::message("CLO mapped to PLO"))
}

/// unmap_clo_from_plo
///
/// [Faculty Route] Removes a CLO->PLO mapping.
#[utoipa::path(
    delete,
    path = "/api/clos/{id}/plos/{plo_id}",
    responses(
        (status = 200, description = "Unmapped"),
        (status = 404, description = "Mapping not found")
    )
)]
pub async fn unmap_clo_from_plo(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, plo_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    ensure_can_manage(&user)?;
    if state.outcomes.unmap_clo_plo(id, plo_id).await? {
        Ok(ApiResponse::message("mapping removed"))
    } else {
        Err(ApiError::not_found("mapping not found"))
    }
}

// --- PLO Handlers ---

/// list_plos
///
/// [Authenticated Route] Lists PLOs, optionally filtered by degree.
#[utoipa::path(
    get,
    path = "/api/plos",
    params(PloFilter),
    responses((status = 200, description = "PLOs", body = [ProgramLearningOutcome]))
)]
pub async fn list_plos(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PloFilter>,
) -> ApiResult<Vec<ProgramLearningOutcome>> {
    let plos = state.outcomes.list_plos(filter.degree_id).await?;
    Ok(ApiResponse::success(plos))
}

/// get_plo
///
/// [Authenticated Route] Retrieves one PLO by id.
#[utoipa::path(
    get,
    path = "/api/plos/{id}",
    responses(
        (status = 200, description = "Found", body = ProgramLearningOutcome),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_plo(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProgramLearningOutcome> {
    let plo = state
        .outcomes
        .get_plo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("PLO not found"))?;
    Ok(ApiResponse::success(plo))
}

/// create_plo
///
/// [Admin Route] Creates a PLO; plo_no must be unique within the degree.
#[utoipa::path(
    post,
    path = "/api/plos",
    request_body = CreatePloRequest,
    responses(
        (status = 201, description = "Created", body = ProgramLearningOutcome),
        (status = 409, description = "Duplicate plo_no")
    )
)]
pub async fn create_plo(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePloRequest>,
) -> ApiResult<ProgramLearningOutcome> {
    super::ensure_admin(&user)?;
    if payload.plo_no < 1 {
        return Err(ApiError::bad_request("plo_no must be positive"));
    }
    if payload.description.trim().is_empty() {
        return Err(ApiError::bad_request("description is required"));
    }
    ensure_percentage(payload.target_attainment, "target_attainment")?;

    if state
        .outcomes
        .plo_no_in_use(payload.degree_id, payload.plo_no)
        .await?
    {
        return Err(ApiError::conflict("plo_no already exists for this degree"));
    }

    let plo = state.outcomes.create_plo(&payload).await?;
    Ok(ApiResponse::created(plo))
}

/// update_plo
///
/// [Admin Route] Partial update of description/target.
#[utoipa::path(
    put,
    path = "/api/plos/{id}",
    request_body = UpdatePloRequest,
    responses(
        (status = 200, description = "Updated", body = ProgramLearningOutcome),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_plo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePloRequest>,
) -> ApiResult<ProgramLearningOutcome> {
    super::ensure_admin(&user)?;
    if let Some(target) = payload.target_attainment {
        ensure_percentage(target, "target_attainment")?;
    }
    let plo = state
        .outcomes
        .update_plo(id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("PLO not found"))?;
    Ok(ApiResponse::success(plo))
}

/// delete_plo
///
/// [Admin Route] Deletes a PLO.
#[utoipa::path(
    delete,
    path = "/api/plos/{id}",
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_plo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    super::ensure_admin(&user)?;
    if state.outcomes.delete_plo(id).await? {
        Ok(ApiResponse::message("PLO deleted"))
    } else {
        Err(ApiError::not_found("PLO not found"))
    }
}

/// get_plo_peos
///
/// [Authenticated Route] PEOs correlated with the PLO.
#[utoipa::path(
    get,
    path = "/api/plos/{id}/peos",
    responses((status = 200, description = "Mapped PEOs", body = [MappedPeo]))
)]
pub async fn get_plo_peos(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MappedPeo>> {
    state
        .outcomes
        .get_plo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("PLO not found"))?;
    let peos = state.outcomes.peos_for_plo(id).await?;
    Ok(ApiResponse::success(peos))
}

/// map_plo_to_peo
///
/// [Admin Route] Correlates a PLO with a PEO (High/Medium/Low).
#[utoipa::path(
    post,
    path = "/api/plos/{id}/peos",
    request_body = MapPloToPeoRequest,
    responses(
        (status = 200, description = "Mapped"),
        (status = 400, description = "Invalid correlation level")
    )
)]
pub async fn map_plo_to_peo(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MapPloToPeoRequest>,
) -> ApiResult<()> {
    super::ensure_admin(&user)?;
    if !VALID_CORRELATION_LEVELS.contains(&payload.correlation_level.as_str()) {
        return Err(ApiError::bad_request(
            "correlation_level must be High, Medium or Low",
        ));
    }
    state
        .outcomes
        .get_plo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("PLO not found"))?;
    state
        .outcomes
        .get_peo(payload.peo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("PEO not found"))?;

    state
        .outcomes
        .map_plo_peo(id, payload.peo_id, &payload.correlation_level)
        .await?;
    Ok(ApiResponse::message("PLO mapped to PEO"))
}

/// unmap_plo_from_peo
///
/// [Admin Route] Removes a PLO->PEO correlation.
#[utoipa::path(
    delete,
    path = "/api/plos/{id}/peos/{peo_id}",
    responses(
        (status = 200, description = "Unmapped"),
        (status = 404, description = "Mapping not found")
    )
)]
pub async fn unmap_plo_from_peo(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, peo_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    super::ensure_admin(&user)?;
    if state.outcomes.unmap_plo_peo(id, peo_id).await? {
        Ok(ApiResponse::message("mapping removed"))
    } else {
        Err(ApiError::not_found("mapping not found"))
    }
}

/// get_plo_attainment
///
/// [Authenticated Route] Rolls the PLO's attainment up from the class-average
/// attainment of every CLO mapped to it. An unmapped PLO reports 0% with
/// clo_count = 0 rather than an error.
#[utoipa::path(
    get,
    path = "/api/plos/{id}/attainment",
    responses(
        (status = 200, description = "Roll-up", body = PloAttainment),
        (status = 404, description = "PLO not found")
    )
)]
pub async fn get_plo_attainment(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<PloAttainment> {
    let plo = state
        .outcomes
        .get_plo(id)
        .await?
        .ok_or_else(|| ApiError::not_found("PLO not found"))?;

    let clo_averages = state.outcomes.clo_average_percentages_for_plo(id).await?;
    let percentage = calc::plo_attainment(&clo_averages);

    Ok(ApiResponse::success(PloAttainment {
        plo_id: plo.id,
        plo_no: plo.plo_no,
        percentage,
        target_attainment: plo.target_attainment,
        is_achieved: calc::is_achieved(percentage, plo.target_attainment),
        clo_count: clo_averages.len() as i64,
    }))
}
