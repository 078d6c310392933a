use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::{roles::ADMIN_ONLY, AuthRouterExt, AuthUser, LoginResponse, NewUser, Role, UserProfile};
use crate::errors::ServiceError;
use crate::handlers::common::{created, ValidatedJson};
use crate::{ApiResponse, ApiResult, AppState};

fn rule_violation(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(rule_violation(
            "username_charset",
            "username may only contain letters, digits and underscores",
        ))
    }
}

/// At least one uppercase letter, one lowercase letter and one digit.
fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    if upper && lower && digit {
        Ok(())
    } else {
        Err(rule_violation(
            "password_strength",
            "password must contain an uppercase letter, a lowercase letter and a digit",
        ))
    }
}

/// Narrower roles are assigned with `warehouse-api create-user`.
fn validate_registration_role(role: &Role) -> Result<(), ValidationError> {
    match role {
        Role::Admin | Role::Operator | Role::Viewer => Ok(()),
        _ => Err(rule_violation(
            "role",
            "role must be one of admin, operator, viewer",
        )),
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 50, message = "username must be 3-50 characters"),
        custom = "validate_username"
    )]
    #[schema(example = "jnovak")]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(
        length(min = 8, message = "password must be at least 8 characters"),
        custom = "validate_password_strength"
    )]
    pub password: String,
    /// `admin`, `operator` or `viewer`; defaults to `operator`
    #[validate(custom = "validate_registration_role")]
    pub role: Option<Role>,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refreshToken is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "oldPassword is required"))]
    pub old_password: String,
    #[validate(
        length(min = 8, message = "newPassword must be at least 8 characters"),
        custom = "validate_password_strength"
    )]
    pub new_password: String,
}

/// Auth endpoints, mounted under `/api/auth`.
pub fn auth_routes() -> Router<AppState> {
    let public = Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh));

    let admin = Router::new()
        .route("/register", post(register))
        .with_roles(ADMIN_ONLY);

    let session = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/change-password", put(change_password))
        .with_auth();

    public.merge(admin).merge(session)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    summary = "Create a user account",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserProfile>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 409, description = "Username or email taken", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(axum::http::StatusCode, Json<ApiResponse<UserProfile>>), ServiceError> {
    let profile = state
        .auth
        .register(NewUser {
            username: request.username.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password: request.password,
            role: request.role.unwrap_or_else(Role::default_for_registration),
            full_name: request.full_name,
        })
        .await?;
    Ok(created(profile, "User created"))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    summary = "Sign in",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Wrong credentials or inactive account", body = crate::errors::ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let tokens = state
        .auth
        .login(request.username.trim(), &request.password)
        .await?;
    Ok(Json(ApiResponse::success(tokens).with_message("Login successful")))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    summary = "Exchange a refresh token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = ApiResponse<AccessToken>),
        (status = 401, description = "Unknown, revoked or expired refresh token", body = crate::errors::ErrorResponse),
    ),
    tag = "Auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> ApiResult<AccessToken> {
    let access_token = state.auth.refresh(request.refresh_token.trim()).await?;
    Ok(Json(ApiResponse::success(AccessToken { access_token })))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    summary = "Revoke a refresh token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token revoked"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<RefreshRequest>,
) -> ApiResult<()> {
    state
        .auth
        .logout(user.user_id, request.refresh_token.trim())
        .await?;
    Ok(Json(ApiResponse::message("Logged out")))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    summary = "Current user",
    responses(
        (status = 200, description = "Profile of the caller", body = ApiResponse<UserProfile>),
        (status = 404, description = "Account no longer exists", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<UserProfile> {
    let profile = state.auth.profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    summary = "Change password",
    description = "Every refresh token of the user is revoked afterwards.",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password is incorrect", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .auth
        .change_password(user.user_id, &request.old_password, &request.new_password)
        .await?;
    Ok(Json(ApiResponse::message("Password changed")))
}
