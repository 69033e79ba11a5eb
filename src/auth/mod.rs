/*!
 * # Authentication and Authorization Module
 *
 * Station staff authenticate with email and password and receive an HS256
 * JWT. Protected routes read the token from `x-access-token` or from an
 * `Authorization: Bearer` header, and admin-only routes add a role gate.
 *
 * Token states map to responses as follows:
 *
 * - no token: 403 "No token provided!"
 * - bad signature, wrong issuer or expired: 401 "Unauthorized!"
 * - valid token below the required role: 403 "Require Admin Role!"
 */

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

pub mod password_policy;
pub mod user;
pub mod types;

pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use types::*;
pub use user::{Role, UserProfile};

/// Header checked before `Authorization`.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Claim structure for JWT tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User's email
    pub role: String,  // admin | super_admin
    pub iat: i64,      // Issued at time
    pub exp: i64,      // Expiration time
    pub iss: String,   // Issuer
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Check if the user passes a gate for `role`
    pub fn has_role(&self, role: Role) -> bool {
        self.role.satisfies(role)
    }

    /// Check if the user is an admin
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            user_id,
            email: claims.email,
            role,
        })
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, jwt_issuer: String, access_token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            access_token_expiration,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthConfig {
    fn from(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.jwt_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Authentication service that handles accounts, token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
    policy: PasswordPolicy,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            policy: PasswordPolicy::default(),
        }
    }

    /// Hash a password into an argon2 PHC string
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::InternalError(format!("Password hashing failed: {}", e)))
    }

    /// Check a password against a stored argon2 hash
    pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::InternalError(format!("Stored hash is malformed: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Public registration. Super admins can only be created out of band.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, AuthError> {
        request.validate()?;
        let role = request.role.unwrap_or(Role::Admin);
        if role == Role::SuperAdmin {
            warn!("refused public registration of a super admin");
            return Err(AuthError::InsufficientRole(Role::SuperAdmin));
        }
        self.create_user(&request.name, &request.email, &request.password, role)
            .await
    }

    /// Create an account with any role; used by registration and the seed tool.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<UserProfile, AuthError> {
        self.policy
            .validate(password)
            .map_err(|e| AuthError::WeakPassword(e.to_string()))?;

        let email = normalize_email(email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.trim().to_string()),
            email: Set(email),
            password_hash: Set(Self::hash_password(password)?),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.as_ref())
        .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user.into())
    }

    /// Verify credentials and issue an access token
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        request.validate()?;
        let user = self
            .find_by_email(&normalize_email(&request.email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !Self::verify_password(&request.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.generate_token(&user)?;
        Ok(LoginResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            access_token,
        })
    }

    /// Load the profile behind an authenticated request
    pub async fn current_user(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::UserNotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AuthError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await?)
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &user::Model) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.config.access_token_expiration.as_secs() as i64,
            iss: self.config.jwt_issuer.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.leeway = 0;

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

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No token provided!")]
    MissingToken,

    #[error("Unauthorized!")]
    InvalidToken,

    #[error("Unauthorized!")]
    TokenExpired,

    #[error("Require {} Role!", role_label(.0))]
    InsufficientRole(Role),

    #[error("Invalid password")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User with this email already exists")]
    EmailTaken,

    #[error("{0}")]
    WeakPassword(String),

    #[error("{0}")]
    Validation(String),

    #[error("Token creation error: {0}")]
    TokenCreation(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn role_label(role: &Role) -> &'static str {
    match role {
        Role::Admin => "Admin",
        Role::SuperAdmin => "Super Admin",
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InsufficientRole(_) => StatusCode::FORBIDDEN,
            Self::InvalidToken | Self::TokenExpired | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken | Self::WeakPassword(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::TokenCreation(_) | Self::DatabaseError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "authentication failed with internal error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = crate::errors::ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// Role middleware to check if a user has the required role
pub async fn role_middleware(
    State(required_role): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingToken)?;

    if !user.has_role(required_role) {
        debug!(user_id = %user.user_id, required = %required_role, "role gate rejected request");
        return Err(AuthError::InsufficientRole(required_role));
    }

    Ok(next.run(request).await)
}

/// Authentication middleware that extracts and validates auth tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
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

/// Extract the bearer of a request from its headers
fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let token = token_from_headers(headers).ok_or(AuthError::MissingToken)?;
    let claims = auth_service.validate_token(&token)?;
    AuthUser::try_from(claims)
}

fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let direct = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = direct {
        return Some(token.to_string());
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_role(self, role: Role) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_role(self, role: Role) -> Self {
        self.layer(axum::middleware::from_fn_with_state(role, role_middleware))
            .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    fn service() -> AuthService {
        AuthService::new(
            AuthConfig::new("k".repeat(64), "gas-station-api".into(), Duration::from_secs(3600)),
            Arc::new(DatabaseConnection::Disconnected),
        )
    }

    fn user(role: Role) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            name: "Amira".into(),
            email: "amira@station.tn".into(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_round_trips_to_auth_user() {
        let svc = service();
        let account = user(Role::SuperAdmin);
        let token = svc.generate_token(&account).unwrap();
        let auth_user = AuthUser::try_from(svc.validate_token(&token).unwrap()).unwrap();
        assert_eq!(auth_user.user_id, account.id);
        assert_eq!(auth_user.role, Role::SuperAdmin);
        assert!(auth_user.is_admin());
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let svc = service();
        let mut other = service();
        other.config.jwt_issuer = "someone-else".into();
        let token = other.generate_token(&user(Role::Admin)).unwrap();
        assert_matches!(svc.validate_token(&token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut svc = service();
        svc.config.access_token_expiration = Duration::from_secs(0);
        let token = svc.generate_token(&user(Role::Admin)).unwrap();
        std::thread::sleep(Duration::from_millis(1100));
        assert_matches!(svc.validate_token(&token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn access_token_header_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, HeaderValue::from_static("direct"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer other"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("direct"));

        headers.remove(ACCESS_TOKEN_HEADER);
        assert_eq!(token_from_headers(&headers).as_deref(), Some("other"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(token_from_headers(&headers), None);
    }

    #[rstest::rstest]
    #[case("Bearer tok", Some("tok"))]
    #[case("bearer tok", Some("tok"))]
    #[case("BEARER  tok ", Some("tok"))]
    #[case("Bearertok", None)]
    #[case("Bearer ", None)]
    #[case("Token tok", None)]
    fn bearer_scheme_is_case_insensitive(#[case] value: &'static str, #[case] expected: Option<&'static str>) {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        assert_eq!(token_from_headers(&headers).as_deref(), expected);
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = AuthService::hash_password("Admin123!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(AuthService::verify_password("Admin123!", &hash).unwrap());
        assert!(!AuthService::verify_password("Admin123?", &hash).unwrap());
    }

    #[test]
    fn auth_errors_map_to_gate_statuses() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InsufficientRole(Role::Admin).to_string(),
            "Require Admin Role!"
        );
        assert_eq!(
            AuthError::InsufficientRole(Role::SuperAdmin).to_string(),
            "Require Super Admin Role!"
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
    }
}
