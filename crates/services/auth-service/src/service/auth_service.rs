//! Authentication service - Handles login and password reset.
//!
//! Passwords are stored and compared as plaintext; nothing here hashes.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use common::{AppError, AppResult, JwtConfig};
use domain::{ResetCode, User, UserResponse, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use user_service_lib::service::UserService;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Returned after a successful login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// JWT access token
    pub token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    pub usuario: UserResponse,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<LoginResponse>;

    /// Issue a reset code for `email` and store it on the record
    async fn forgot_password(&self, email: &str) -> AppResult<ResetCode>;

    /// Set a new password using a previously issued code
    async fn reset_password(&self, email: &str, code: &str, new_password: String)
        -> AppResult<()>;

    /// Drop a pending reset code. Returns false if none was pending.
    async fn clean_reset_code(&self, email: &str, code: &str) -> AppResult<bool>;
}

/// Concrete implementation of AuthService over the user service.
pub struct Authenticator {
    users: Arc<dyn UserService>,
    jwt: JwtConfig,
}

impl Authenticator {
    /// Create new auth service instance
    pub fn new(users: Arc<dyn UserService>, jwt: JwtConfig) -> Self {
        Self { users, jwt }
    }

    fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }

    /// Generate JWT token for a user
    fn generate_token(&self, user: &User) -> AppResult<LoginResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.jwt.expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret_bytes()),
        )?;

        Ok(LoginResponse {
            token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.jwt.expiration_hours * SECONDS_PER_HOUR,
            usuario: UserResponse::from(user),
        })
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn login(&self, email: String, password: String) -> AppResult<LoginResponse> {
        let user = match self.users.get_user_by_email(&email).await {
            Ok(user) => user,
            // Unknown email and wrong password look the same to the caller
            Err(AppError::NotFound(_)) => return Err(AppError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        if !user.password_matches(&password) {
            warn!(id = user.id, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        info!(id = user.id, "User logged in");
        self.generate_token(&user)
    }

    async fn forgot_password(&self, email: &str) -> AppResult<ResetCode> {
        let code = ResetCode::generate();
        let user = self
            .users
            .store_reset_code(email, code.as_str().to_string())
            .await?;

        info!(id = user.id, "Reset code issued");
        Ok(code)
    }

    async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.users.reset_password(email, code, new_password).await?;
        info!(id = user.id, "Password reset");
        Ok(())
    }

    async fn clean_reset_code(&self, email: &str, code: &str) -> AppResult<bool> {
        self.users.clear_reset_code(email, code).await
    }
}
