use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod audit;
pub mod auth;
pub mod calc;
pub mod config;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use repository::{
    AssessmentRepositoryState, AuditRepositoryState, MarkRepositoryState, OutcomeRepositoryState,
    PostgresRepository, ResultRepositoryState, UserRepositoryState,
};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application by aggregating every `#[utoipa::path]` handler and
/// `ToSchema` model. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::register, handlers::login, handlers::get_me,
        handlers::list_clos, handlers::get_clo, handlers::create_clo,
        handlers::update_clo, handlers::delete_clo,
        handlers::get_clo_plos, handlers::map_clo_to_plo, handlers::unmap_clo_from_plo,
        handlers::list_plos, handlers::get_plo, handlers::create_plo,
        handlers::update_plo, handlers::delete_plo,
        handlers::get_plo_peos, handlers::map_plo_to_peo, handlers::unmap_plo_from_peo,
        handlers::get_plo_attainment,
        handlers::list_assessment_types, handlers::create_assessment_type,
        handlers::update_assessment_type, handlers::delete_assessment_type,
        handlers::list_components, handlers::get_component, handlers::create_component,
        handlers::update_component, handlers::delete_component,
        handlers::list_clo_allocations, handlers::set_clo_allocation,
        handlers::delete_clo_allocation,
        handlers::list_questions, handlers::create_question, handlers::delete_question,
        handlers::create_mark, handlers::bulk_marks, handlers::component_marks,
        handlers::student_marks, handlers::create_question_mark,
        handlers::bulk_question_marks, handlers::student_question_marks,
        handlers::compute_attainment, handlers::course_attainment,
        handlers::student_attainment,
        handlers::compute_semester_result, handlers::student_results,
        handlers::publish_result, handlers::unpublish_result,
        handlers::list_audit_logs, handlers::get_admin_stats,
    ),
    components(
        schemas(
            models::RegisterRequest, models::LoginRequest, models::LoginResponse,
            models::User, models::UserProfile,
            models::CourseLearningOutcome, models::CreateCloRequest, models::UpdateCloRequest,
            models::ProgramLearningOutcome, models::CreatePloRequest, models::UpdatePloRequest,
            models::ProgramEducationalObjective,
            models::MappedPlo, models::MappedPeo,
            models::MapCloToPloRequest, models::MapPloToPeoRequest, models::PloAttainment,
            models::AssessmentType, models::CreateAssessmentTypeRequest,
            models::AssessmentComponent, models::CreateComponentRequest,
            models::UpdateComponentRequest,
            models::CloAllocation, models::SetCloAllocationRequest,
            models::Question, models::CreateQuestionRequest,
            models::StudentAssessmentMark, models::StudentQuestionMark,
            models::CreateMarkRequest, models::BulkMarksRequest,
            models::CreateQuestionMarkRequest, models::BulkQuestionMarksRequest,
            models::BulkEntryError, models::BulkOutcome,
            models::StudentCloAttainmentRow, models::CloAttainmentSummaryRow,
            models::SemesterResult, models::ComputeSemesterResultRequest,
            models::AuditLog, models::AdminDashboardStats,
        )
    ),
    tags(
        (name = "obe-portal", description = "Outcome-Based Education Portal API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: one thread-safe, immutable
/// container holding every repository handle plus the loaded configuration,
/// shared across all incoming requests. The six repository fields are trait
/// objects so tests can swap in mock implementations per domain.
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepositoryState,
    pub outcomes: OutcomeRepositoryState,
    pub assessments: AssessmentRepositoryState,
    pub marks: MarkRepositoryState,
    pub results: ResultRepositoryState,
    pub audit: AuditRepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow extractors (notably `AuthUser`) to pull individual components
// out of the shared AppState.

impl FromRef<AppState> for UserRepositoryState {
    fn from_ref(app_state: &AppState) -> UserRepositoryState {
        app_state.users.clone()
    }
}

impl FromRef<AppState> for OutcomeRepositoryState {
    fn from_ref(app_state: &AppState) -> OutcomeRepositoryState {
        app_state.outcomes.clone()
    }
}

impl FromRef<AppState> for AssessmentRepositoryState {
    fn from_ref(app_state: &AppState) -> AssessmentRepositoryState {
        app_state.assessments.clone()
    }
}

impl FromRef<AppState> for MarkRepositoryState {
    fn from_ref(app_state: &AppState) -> MarkRepositoryState {
        app_state.marks.clone()
    }
}

impl FromRef<AppState> for ResultRepositoryState {
    fn from_ref(app_state: &AppState) -> ResultRepositoryState {
        app_state.results.clone()
    }
}

impl FromRef<AppState> for AuditRepositoryState {
    fn from_ref(app_state: &AppState) -> AuditRepositoryState {
        app_state.audit.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the protected route groups.
///
/// *Mechanism*: it runs the `AuthUser` extractor; since `AuthUser`
/// implements `FromRequestParts`, a failed JWT validation or user lookup
/// rejects the request with 401 before any handler runs. On success the
/// resolved identity is stored in the request extensions so that the audit
/// middleware can attribute the mutation.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No middleware applied.
        .merge(public::public_routes())
        // Protected Routes: the authenticated and admin groups share the same
        // authentication layer; admin-role checks happen inside the handlers.
        // Successful mutations are recorded by the audit middleware. The auth
        // layer is added last so it runs first and the audit layer can read
        // the resolved identity from the request extensions.
        .merge(
            authenticated::authenticated_routes()
                .merge(admin::admin_routes())
                .route_layer(middleware::from_fn_with_state(state.clone(), audit::auto_audit))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: wraps the request/response lifecycle in a
                // tracing span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: returns x-request-id to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: includes the
/// `x-request-id` header (if present) alongside the HTTP method and URI so
/// every log line of a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
