use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Defines the routes exclusively accessible to users with the 'admin' role:
/// result computation and publication, the audit trail, and dashboard
/// statistics.
///
/// Access Control:
/// This router is merged behind the same authentication layer as the
/// authenticated routes; the `role='admin'` check itself happens inside each
/// handler (via `ensure_admin`) so that an authenticated non-admin receives
/// a 403 rather than a 401.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/semester-results/compute
        // SGPA/CGPA computation for one (student, semester); always lands
        // unpublished.
        .route(
            "/api/semester-results/compute",
            post(handlers::compute_semester_result),
        )
        // PUT /api/semester-results/{id}/publish | /unpublish
        // Toggles student visibility of a computed result.
        .route(
            "/api/semester-results/{id}/publish",
            put(handlers::publish_result),
        )
        .route(
            "/api/semester-results/{id}/unpublish",
            put(handlers::unpublish_result),
        )
        // GET /api/audit-logs?user_id=&table_name=&action=&limit=&offset=
        // Paged view of the mutation audit trail, newest first.
        .route("/api/audit-logs", get(handlers::list_audit_logs))
        // GET /api/admin/stats
        // Aggregate counts for the administrative dashboard.
        .route("/api/admin/stats", get(handlers::get_admin_stats))
}
