use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    repository::UserRepositoryState,
};

/// Claims
///
/// Payload structure of the JWTs issued by the login endpoint and validated
/// on every authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user, primary key of the `users` table.
    pub sub: Uuid,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers receive this
/// struct via the extractor below and use `role` for all RBAC checks.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    /// 'admin', 'faculty' or 'student'.
    pub role: String,
}

impl AuthUser {
    /// True for the roles allowed to create and mutate outcome, assessment
    /// and mark records.
    pub fn can_manage(&self) -> bool {
        self.role == "admin" || self.role == "faculty"
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// issue_token
///
/// Signs a session JWT for a freshly authenticated user. The expiry window
/// comes from `AppConfig::token_expiry_hours`.
pub fn issue_token(
    user_id: Uuid,
    config: &AppConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(config.token_expiry_hours)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// hash_password
///
/// SHA-256 hex digest of the raw password. Digests are computed here, before
/// the repository boundary, so plaintext passwords never reach the data layer.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// verify_password
///
/// Constant-shape comparison of a candidate password against a stored digest.
pub fn verify_password(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any authenticated handler. This cleanly separates
/// authentication (extractor) from business logic (the handler).
///
/// The process:
/// 1. Dependency Resolution: Accessing the user repository and AppConfig from state.
/// 2. Local Bypass: Allowing development-time access using the 'x-user-id' header.
/// 3. Token Validation: Standard Bearer token extraction and JWT decoding.
/// 4. DB Lookup: Fetching the user's current role and existence from Postgres.
///
/// Rejection: Returns StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    UserRepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Dependency Resolution
        let users = UserRepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass Check
        // In Env::Local a known user UUID in the 'x-user-id' header authenticates
        // the request directly. The UUID must still resolve to a real row so the
        // role is loaded correctly.
        if config.env == Env::Local
            && let Some(user_id_header) = parts.headers.get("x-user-id")
            && let Ok(id_str) = user_id_header.to_str()
            && let Ok(user_id) = Uuid::parse_str(id_str)
            && let Ok(Some(user)) = users.get_user(user_id).await
        {
            return Ok(AuthUser {
                id: user.id,
                role: user.role,
            });
        }
        // If Env is Production, or the bypass failed, execution falls through
        // to the standard JWT validation flow.

        // 3. Token Extraction
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // 4. JWT Decoding and Validation
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        // 5. Database Lookup (Final Verification)
        // Prevents access if the user was deleted or demoted after the token
        // was issued.
        let user = users
            .get_user(token_data.claims.sub)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}
