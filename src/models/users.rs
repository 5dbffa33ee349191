use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// User
///
/// Public view of a user record from the `users` table. The password digest
/// never leaves the repository layer (see `UserCredentials`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    // The RBAC field: 'admin', 'faculty' or 'student'.
    pub role: String,
}

/// UserCredentials
///
/// Raw Database Row (Internal Use). Carries the stored password digest for
/// login verification. Deliberately not serializable so it can never be
/// returned from a handler by accident.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub password_digest: String,
}

/// Roles accepted by the registration endpoint.
pub const VALID_ROLES: &[&str] = &["admin", "faculty", "student"];

/// RegisterRequest
///
/// Input payload for the public registration endpoint (POST /api/auth/register).
/// The password is digested (SHA-256) before it ever reaches the repository.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

/// LoginRequest
///
/// Input payload for POST /api/auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// Output schema for a successful login: the signed bearer token, its expiry
/// window in seconds, and the resolved user profile for the dashboard shell.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// UserProfile
///
/// Output schema for the authenticated user's profile (GET /api/me).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}
