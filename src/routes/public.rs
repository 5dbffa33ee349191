use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are unauthenticated and accessible to any client:
/// the health probe and the identity gateway (registration and login).
/// Everything else in the API requires a bearer token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /api/auth/register
        // New account creation. The role is validated against the fixed set
        // (admin, faculty, student) and the email must be unique.
        .route("/api/auth/register", post(handlers::register))
        // POST /api/auth/login
        // Credential check and JWT issuance. Failures return 401 without
        // distinguishing unknown email from wrong password.
        .route("/api/auth/login", post(handlers::login))
}
