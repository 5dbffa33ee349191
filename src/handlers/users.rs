use axum::{
    Json,
    extract::State,
};

use crate::{
    AppState,
    auth::{self, AuthUser},
    models::{LoginRequest, LoginResponse, RegisterRequest, User, UserProfile, VALID_ROLES},
    response::{ApiError, ApiResponse, ApiResult},
};

/// register
///
/// [Public Route] Creates a user account. The password is digested before it
/// reaches the repository; duplicate emails are rejected with 409.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<User> {
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(ApiError::bad_request("a valid email is required"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    if !VALID_ROLES.contains(&payload.role.as_str()) {
        return Err(ApiError::bad_request(
            "role must be one of admin, faculty, student",
        ));
    }

    if state.users.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("email already registered"));
    }

    let digest = auth::hash_password(&payload.password);
    let user = state
        .users
        .create_user(&payload.email, &digest, &payload.role)
        .await?;

    Ok(ApiResponse::created(user))
}

/// login
///
/// [Public Route] Verifies credentials and issues a signed session token.
/// Bad email and bad password are indistinguishable in the response.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let credentials = state
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid email or password"))?;

    if !auth::verify_password(&payload.password, &credentials.password_digest) {
        return Err(ApiError::unauthorized("invalid email or password"));
    }

    let token = auth::issue_token(credentials.id, &state.config).map_err(|e| {
        tracing::error!("failed to sign session token: {:?}", e);
        ApiError::internal()
    })?;

    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: state.config.token_expiry_hours * 3600,
        user: User {
            id: credentials.id,
            email: credentials.email,
            role: credentials.role,
        },
    }))
}

/// get_me
///
/// [Authenticated Route] Returns the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/me",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<UserProfile> {
    let profile = state
        .users
        .get_profile(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(ApiResponse::success(profile))
}
