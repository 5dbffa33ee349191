use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has passed the
/// authentication layer: outcome and assessment management, mark entry,
/// attainment views and semester results.
///
/// Access Control Strategy:
/// Every handler here relies on the `AuthUser` extractor middleware being
/// present on the router layer above this module. Role restrictions beyond
/// "authenticated" (faculty write access, student self-only views) are
/// enforced inside the handlers so that the 403 message can name the
/// missing role.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // The authenticated user's own profile.
        .route("/api/me", get(handlers::get_me))
        // --- Course Learning Outcomes ---
        // GET /api/clos?course_id=...  (optional course filter)
        // POST /api/clos               (faculty: create, code unique per course)
        .route(
            "/api/clos",
            get(handlers::list_clos).post(handlers::create_clo),
        )
        // GET/PUT/DELETE /api/clos/{id}
        // PUT is a partial update; unset fields keep their stored values.
        .route(
            "/api/clos/{id}",
            get(handlers::get_clo)
                .put(handlers::update_clo)
                .delete(handlers::delete_clo),
        )
        // GET /api/clos/{id}/plos   Mapped PLOs with mapping levels.
        // POST /api/clos/{id}/plos  Upserts one mapping (level 1..=3).
        .route(
            "/api/clos/{id}/plos",
            get(handlers::get_clo_plos).post(handlers::map_clo_to_plo),
        )
        // DELETE /api/clos/{id}/plos/{plo_id}
        .route(
            "/api/clos/{id}/plos/{plo_id}",
            delete(handlers::unmap_clo_from_plo),
        )
        // --- Program Learning Outcomes ---
        // GET /api/plos?degree_id=...
        // POST /api/plos (admin: plo_no unique per degree)
        .route(
            "/api/plos",
            get(handlers::list_plos).post(handlers::create_plo),
        )
        .route(
            "/api/plos/{id}",
            get(handlers::get_plo)
                .put(handlers::update_plo)
                .delete(handlers::delete_plo),
        )
        // PEO mappings mirror the CLO->PLO mapping endpoints.
        .route(
            "/api/plos/{id}/peos",
            get(handlers::get_plo_peos).post(handlers::map_plo_to_peo),
        )
        .route(
            "/api/plos/{id}/peos/{peo_id}",
            delete(handlers::unmap_plo_from_peo),
        )
        // GET /api/plos/{id}/attainment
        // Averages the mapped CLOs' attainment from the stored summaries.
        .route("/api/plos/{id}/attainment", get(handlers::get_plo_attainment))
        // --- Assessment Types ---
        .route(
            "/api/assessments/types",
            get(handlers::list_assessment_types).post(handlers::create_assessment_type),
        )
        // DELETE returns 409 while components still reference the type.
        .route(
            "/api/assessments/types/{id}",
            put(handlers::update_assessment_type).delete(handlers::delete_assessment_type),
        )
        // --- Assessment Components ---
        // GET requires ?course_offering_id=...
        .route(
            "/api/assessments/components",
            get(handlers::list_components).post(handlers::create_component),
        )
        .route(
            "/api/assessments/components/{id}",
            get(handlers::get_component)
                .put(handlers::update_component)
                .delete(handlers::delete_component),
        )
        // CLO mark allocations within one component; allocations may not
        // exceed the component's total marks.
        .route(
            "/api/assessments/components/{id}/clos",
            get(handlers::list_clo_allocations).post(handlers::set_clo_allocation),
        )
        .route(
            "/api/assessments/components/{id}/clos/{clo_id}",
            delete(handlers::delete_clo_allocation),
        )
        // Questions of one component, each mapped to a single CLO.
        .route(
            "/api/assessments/components/{id}/questions",
            get(handlers::list_questions).post(handlers::create_question),
        )
        .route(
            "/api/assessments/questions/{id}",
            delete(handlers::delete_question),
        )
        // --- Mark Entry ---
        // POST /api/marks is an upsert keyed on (student, component).
        .route("/api/marks", post(handlers::create_mark))
        // POST /api/marks/bulk: per-row validation, 201/207/400.
        .route("/api/marks/bulk", post(handlers::bulk_marks))
        .route(
            "/api/marks/components/{id}",
            get(handlers::component_marks),
        )
        .route("/api/marks/students/{id}", get(handlers::student_marks))
        .route("/api/marks/questions", post(handlers::create_question_mark))
        .route(
            "/api/marks/questions/bulk",
            post(handlers::bulk_question_marks),
        )
        .route(
            "/api/marks/questions/students/{id}",
            get(handlers::student_question_marks),
        )
        // --- Attainment ---
        // POST recomputes the derived tables from question marks.
        .route(
            "/api/attainment/compute/{course_offering_id}",
            post(handlers::compute_attainment),
        )
        .route(
            "/api/attainment/courses/{course_offering_id}",
            get(handlers::course_attainment),
        )
        .route(
            "/api/attainment/students/{id}",
            get(handlers::student_attainment),
        )
        // --- Semester Results ---
        // Students see only their own published rows; staff see everything.
        .route(
            "/api/semester-results/students/{id}",
            get(handlers::student_results),
        )
}
