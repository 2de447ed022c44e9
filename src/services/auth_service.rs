//! Authentication service - registration, login and session verification.
//!
//! Tokens carry the role at issue time, but [`AuthService::verify`] always
//! reloads the user so a role change applies on the very next request.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::infra::UnitOfWork;
use common::{AppError, AppResult};
use domain::{validate_username, Identity, NewUser, Password, RoleId, User, UserResponse};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: i16,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Hash verified against when the username is unknown, so both paths cost
/// one Argon2 verification.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("not-a-real-account-password")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new customer account
    async fn register(
        &self,
        username: String,
        password: String,
        email: Option<String>,
        phone: Option<String>,
    ) -> AppResult<User>;

    /// Create an account with an arbitrary role. Not exposed over HTTP; used
    /// to bootstrap the first administrators.
    async fn create_account(
        &self,
        username: String,
        password: String,
        role: RoleId,
    ) -> AppResult<User>;

    /// Login and return a JWT token
    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse>;

    /// Resolve a bearer token to the caller's current identity
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt.expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.id(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt.secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt.expiration_hours * SECONDS_PER_HOUR,
        user: user.clone().into(),
    })
}

fn decode_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt.secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    async fn create_user(
        &self,
        username: String,
        password: String,
        email: Option<String>,
        phone: Option<String>,
        role: RoleId,
    ) -> AppResult<User> {
        let username = username.trim().to_string();
        validate_username(&username)?;
        let password_hash = Password::new(&password)?.into_string();

        let user = self
            .uow
            .users()
            .create(NewUser {
                username,
                password_hash,
                email,
                phone,
                role,
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        username: String,
        password: String,
        email: Option<String>,
        phone: Option<String>,
    ) -> AppResult<User> {
        self.create_user(username, password, email, phone, RoleId::Customer)
            .await
    }

    async fn create_account(
        &self,
        username: String,
        password: String,
        role: RoleId,
    ) -> AppResult<User> {
        self.create_user(username, password, None, None, role).await
    }

    async fn login(&self, username: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_username(username.trim()).await?;

        let stored_hash = user
            .as_ref()
            .map_or(DUMMY_HASH.as_str(), |u| u.password_hash.as_str());
        let password_valid = Password::from_hash(stored_hash.to_string()).verify(&password);

        match user {
            Some(user) if password_valid => generate_token(&user, &self.config),
            _ => {
                tracing::warn!(username = %username, "Failed login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let claims = decode_token(token, &self.config)?;
        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(user.identity())
    }
}
