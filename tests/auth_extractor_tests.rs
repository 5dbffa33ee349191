use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use obe_portal::{
    auth::{AuthUser, Claims},
    config::{AppConfig, Env},
    models::{User, UserCredentials, UserProfile},
    repository::{UserRepository, UserRepositoryState},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{sync::Arc, time::SystemTime};
use uuid::Uuid;

// --- Mock Repository for Auth Logic ---

// The extractor only needs the user repository, so the test state carries
// just that plus the config.
#[derive(Default)]
struct MockAuthRepo {
    user_to_return: Option<User>,
}

#[async_trait]
impl UserRepository for MockAuthRepo {
    async fn get_user(&self, _id: Uuid) -> sqlx::Result<Option<User>> {
        Ok(self.user_to_return.clone())
    }
    async fn get_profile(&self, _id: Uuid) -> sqlx::Result<Option<UserProfile>> {
        Ok(None)
    }
    async fn find_by_email(&self, _email: &str) -> sqlx::Result<Option<UserCredentials>> {
        Ok(None)
    }
    async fn create_user(
        &self,
        _email: &str,
        _password_digest: &str,
        _role: &str,
    ) -> sqlx::Result<User> {
        Ok(User::default())
    }
}

#[derive(Clone)]
struct AuthTestState {
    users: UserRepositoryState,
    config: AppConfig,
}

impl FromRef<AuthTestState> for UserRepositoryState {
    fn from_ref(state: &AuthTestState) -> UserRepositoryState {
        state.users.clone()
    }
}

impl FromRef<AuthTestState> for AppConfig {
    fn from_ref(state: &AuthTestState) -> AppConfig {
        state.config.clone()
    }
}

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_USER_ID: Uuid = Uuid::from_u128(1);

fn create_token(user_id: Uuid, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset).max(0) as usize,
    };

    let key = EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn create_auth_state(env: Env, repo: MockAuthRepo) -> AuthTestState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    AuthTestState {
        users: Arc::new(repo),
        config,
    }
}

fn known_user() -> MockAuthRepo {
    MockAuthRepo {
        user_to_return: Some(User {
            id: TEST_USER_ID,
            email: "test@uni.edu".to_string(),
            role: "faculty".to_string(),
        }),
    }
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let token = create_token(TEST_USER_ID, 3600);
    let state = create_auth_state(Env::Production, known_user());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, TEST_USER_ID);
    assert_eq!(auth_user.role, "faculty");
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let state = create_auth_state(Env::Production, known_user());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_malformed_header() {
    let state = create_auth_state(Env::Production, known_user());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_token() {
    let token = create_token(TEST_USER_ID, -3600);
    let state = create_auth_state(Env::Production, known_user());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_when_user_deleted_after_issue() {
    // Valid signature, but the account no longer resolves in the database.
    let token = create_token(TEST_USER_ID, 3600);
    let state = create_auth_state(Env::Production, MockAuthRepo::default());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );

    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_local_header_bypass_resolves_user() {
    let state = create_auth_state(Env::Local, known_user());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        "x-user-id",
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(auth_user.id, TEST_USER_ID);
    // Role still comes from the database row, not from the header.
    assert_eq!(auth_user.role, "faculty");
}

#[tokio::test]
async fn test_header_bypass_ignored_in_production() {
    let state = create_auth_state(Env::Production, known_user());

    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        "x-user-id",
        header::HeaderValue::from_str(&TEST_USER_ID.to_string()).unwrap(),
    );

    // No bearer token, so production must reject despite the header.
    let result = AuthUser::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}
