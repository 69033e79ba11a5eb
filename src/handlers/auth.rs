use crate::{
    auth::{AuthError, AuthUser, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfile},
    handlers::{
        common::{created_response, success_response},
        extract::Json,
    },
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
    Extension,
};

/// Register a station user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Invalid payload, weak password or email taken", body = crate::errors::ErrorResponse),
        (status = 403, description = "Role cannot be self-assigned", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let user = state.auth.register(payload).await?;
    Ok(created_response(RegisterResponse {
        message: "User registered successfully!".to_string(),
        user,
    }))
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Wrong password", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown user", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = state.auth.login(payload).await?;
    Ok(success_response(response))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Invalid or expired token", body = crate::errors::ErrorResponse),
        (status = 403, description = "No token provided", body = crate::errors::ErrorResponse),
        (status = 404, description = "User no longer exists", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AuthError> {
    let profile = state.auth.current_user(user.user_id).await?;
    Ok(success_response(profile))
}
