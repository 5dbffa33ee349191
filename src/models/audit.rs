use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// AuditLog
///
/// One row of the `audit_logs` table, written by the `auto_audit` middleware
/// for every successful mutating request under /api. `new_values` holds the
/// response body that was sent to the client (the post-mutation state).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    // HTTP method of the mutating request: POST, PUT, PATCH or DELETE.
    pub action: String,
    // Resource family, derived from the first path segment after /api.
    pub table_name: String,
    pub record_id: Option<String>,
    #[ts(type = "any")]
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewAuditLog
///
/// The insert payload assembled by the middleware (ids and timestamp are
/// generated in the repository).
#[derive(Debug, Clone, Default)]
pub struct NewAuditLog {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<String>,
    pub new_values: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// AdminDashboardStats
///
/// Output schema for the administrative statistics dashboard (GET /api/admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_clos: i64,
    pub total_plos: i64,
    pub total_components: i64,
    pub total_mark_entries: i64,
    /// Semester result rows still awaiting publication.
    pub unpublished_results: i64,
}
