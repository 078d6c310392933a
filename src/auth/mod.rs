/*!
 * # Authentication and Authorization Module
 *
 * Users sign in with a username and password and receive a short-lived HS256
 * access token plus an opaque refresh token stored in the database. Every
 * protected route runs [`auth_middleware`] to turn the bearer token into an
 * [`AuthUser`], then a role gate built from [`roles`].
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::services::map_unique_violation;

// Entity modules
pub mod refresh_token;
pub mod user;

// Feature modules
pub mod handlers;
pub mod password;
pub mod roles;

pub use handlers::auth_routes;
pub use roles::{authorize, Role};

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Claim structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub jti: String,      // JWT ID
    pub iat: i64,         // Issued at time
    pub exp: i64,         // Expiration time
    pub nbf: i64,         // Not valid before time
    pub iss: String,      // Issuer
    pub aud: String,      // Audience
}

/// Authenticated user data extracted from the access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub token_id: String,
}

impl AuthUser {
    /// Parsed role; `None` for roles this service doesn't know.
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role).ok()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
            token_id: claims.jti,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AuthError::MissingAuth.into())
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub access_token_expiration: Duration,
    pub refresh_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        access_token_expiration: Duration,
        refresh_token_expiration: Duration,
    ) -> Result<Self, AuthError> {
        if jwt_secret.trim().is_empty() {
            return Err(AuthError::InternalError(
                "JWT secret must not be empty".to_string(),
            ));
        }
        if access_token_expiration.is_zero() || refresh_token_expiration.is_zero() {
            return Err(AuthError::InternalError(
                "Token lifetimes must be positive".to_string(),
            ));
        }
        Ok(Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            access_token_expiration,
            refresh_token_expiration,
        })
    }

    pub fn from_app_config(cfg: &AppConfig) -> Result<Self, AuthError> {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_issuer.clone(),
            cfg.auth_audience.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
            Duration::from_secs(cfg.refresh_token_expiration as u64),
        )
    }
}

/// Registration input after request validation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub full_name: Option<String>,
}

/// Public view of a user account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            email: model.email,
            role: model.role,
            full_name: model.full_name,
            last_login: model.last_login,
            created_at: model.created_at,
        }
    }
}

/// Tokens handed out on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Authentication service that handles accounts and token issuance
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Creates a user account. Username and email must both be unused.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: NewUser) -> Result<UserProfile, ServiceError> {
        let taken = user::Entity::find()
            .filter(
                user::Column::Username
                    .eq(input.username.as_str())
                    .or(user::Column::Email.eq(input.email.as_str())),
            )
            .one(&*self.db)
            .await?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(
                "A user with this username or email already exists".to_string(),
            ));
        }

        let password_hash = password::hash_password(&input.password)?;
        let active = user::ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(password_hash),
            role: Set(input.role.to_string()),
            full_name: Set(input.full_name),
            is_active: Set(true),
            last_login: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        let created = active.insert(&*self.db).await.map_err(|e| {
            map_unique_violation(e, || {
                "A user with this username or email already exists".to_string()
            })
        })?;

        info!(user_id = created.user_id, role = %created.role, "User registered");
        Ok(created.into())
    }

    /// Verifies credentials and issues an access/refresh token pair.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::IsActive.eq(true))
            .one(&*self.db)
            .await?;
        let Some(account) = found else {
            return Err(AuthError::InvalidCredentials.into());
        };

        if !password::verify_password(password, &account.password_hash)? {
            warn!(username = %username, "Failed login attempt");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self.issue_access_token(&account)?;
        let refresh_token = generate_refresh_token();
        let now = Utc::now();
        let expires_at = now + to_chrono(self.config.refresh_token_expiration)?;

        let txn = self.db.begin().await?;
        refresh_token::ActiveModel {
            user_id: Set(account.user_id),
            token: Set(refresh_token.clone()),
            expires_at: Set(expires_at),
            is_revoked: Set(false),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut touched: user::ActiveModel = account.into();
        touched.last_login = Set(Some(now));
        let account = touched.update(&txn).await?;
        txn.commit().await?;

        info!(user_id = account.user_id, "User logged in");
        Ok(LoginResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
            user: account.into(),
        })
    }

    /// Exchanges a stored refresh token for a new access token.
    #[instrument(skip(self, token))]
    pub async fn refresh(&self, token: &str) -> Result<String, ServiceError> {
        let found = refresh_token::Entity::find()
            .filter(refresh_token::Column::Token.eq(token))
            .find_also_related(user::Entity)
            .one(&*self.db)
            .await?;

        let (stored, account) = match found {
            Some((stored, Some(account))) => (stored, account),
            _ => return Err(AuthError::InvalidToken.into()),
        };
        if !stored.is_usable(Utc::now()) {
            return Err(AuthError::RevokedToken.into());
        }
        if !account.is_active {
            return Err(AuthError::InvalidCredentials.into());
        }

        debug!(user_id = account.user_id, "Refreshing access token");
        Ok(self.issue_access_token(&account)?)
    }

    /// Revokes one refresh token belonging to `user_id`.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, user_id: i32, token: &str) -> Result<(), ServiceError> {
        let result = refresh_token::Entity::update_many()
            .col_expr(refresh_token::Column::IsRevoked, Expr::value(true))
            .filter(refresh_token::Column::Token.eq(token))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;
        info!(user_id, revoked = result.rows_affected, "User logged out");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: i32) -> Result<UserProfile, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AuthError::UserNotFound.into())
    }

    /// Replaces the password and revokes every refresh token of the user.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: i32,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let account = user::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password::verify_password(old_password, &account.password_hash)? {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut active: user::ActiveModel = account.into();
        active.password_hash = Set(password::hash_password(new_password)?);
        active.update(&txn).await?;

        refresh_token::Entity::update_many()
            .col_expr(refresh_token::Column::IsRevoked, Expr::value(true))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    /// Signs an access token for `account`.
    pub fn issue_access_token(&self, account: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + to_chrono(self.config.access_token_expiration)?;
        let claims = Claims {
            sub: account.user_id.to_string(),
            user_id: account.user_id,
            username: account.username.clone(),
            email: account.email.clone(),
            role: account.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate an access token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }
}

fn to_chrono(duration: Duration) -> Result<ChronoDuration, AuthError> {
    ChronoDuration::from_std(duration)
        .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))
}

fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth => ServiceError::Unauthorized("Authentication required".into()),
            AuthError::InvalidCredentials => {
                ServiceError::Unauthorized("Invalid username or password".into())
            }
            AuthError::InvalidToken => {
                ServiceError::Unauthorized("Invalid authentication token".into())
            }
            AuthError::TokenExpired => ServiceError::Unauthorized("Token has expired".into()),
            AuthError::RevokedToken => {
                ServiceError::Unauthorized("Invalid or expired refresh token".into())
            }
            AuthError::UserNotFound => ServiceError::NotFound("User not found".into()),
            AuthError::InsufficientPermissions => ServiceError::Forbidden(
                "User does not have sufficient permissions for this operation".into(),
            ),
            AuthError::TokenCreation(msg) => ServiceError::JwtError(msg),
            AuthError::Hash(msg) => ServiceError::HashError(msg),
            AuthError::InternalError(msg) => ServiceError::InternalError(msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ServiceError::from(self).into_response()
    }
}

/// Role gate: admits users whose role passes [`authorize`] for `allowed`.
pub async fn role_middleware(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    let permitted = user.role().map_or(false, |role| authorize(role, allowed));
    if !permitted {
        warn!(user_id = user.user_id, role = %user.role, "Role not permitted for route");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return AuthError::InternalError("Authentication service not available".to_string())
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingAuth)?;

    auth_service.validate_token(token).map(AuthUser::from)
}

/// Router extension trait for attaching authentication and role gates.
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_roles(self, allowed: &'static [Role]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.route_layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_roles(self, allowed: &'static [Role]) -> Self {
        self.route_layer(axum::middleware::from_fn_with_state(
            allowed,
            role_middleware,
        ))
        .with_auth()
    }
}
