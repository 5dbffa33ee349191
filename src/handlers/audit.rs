use axum::extract::{Query, State};
use serde::Deserialize;
use uuid::Uuid;

use super::ensure_admin;
use crate::{
    AppState,
    auth::AuthUser,
    models::{AdminDashboardStats, AuditLog},
    response::{ApiResponse, ApiResult},
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// AuditLogFilter
///
/// Accepted query parameters for GET /api/audit-logs. The page size defaults
/// to 50 and is capped at 200.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct AuditLogFilter {
    pub user_id: Option<Uuid>,
    pub table_name: Option<String>,
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// list_audit_logs
///
/// [Admin Route] Paged, filterable view of the audit trail, newest first.
#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(AuditLogFilter),
    responses(
        (status = 200, description = "Audit entries", body = [AuditLog]),
        (status = 403, description = "Admins only")
    )
)]
pub async fn list_audit_logs(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<AuditLogFilter>,
) -> ApiResult<Vec<AuditLog>> {
    ensure_admin(&user)?;

    let limit = filter
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = filter.offset.unwrap_or(0).max(0);

    let logs = state
        .audit
        .list(filter.user_id, filter.table_name, filter.action, limit, offset)
        .await?;
    Ok(ApiResponse::success(logs))
}

/// get_admin_stats
///
/// [Admin Route] Aggregate counts for the administrative dashboard.
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Counts", body = AdminDashboardStats),
        (status = 403, description = "Admins only")
    )
)]
pub async fn get_admin_stats(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<AdminDashboardStats> {
    ensure_admin(&user)?;
    let stats = state.audit.stats().await?;
    Ok(ApiResponse::success(stats))
}
