//! Auth service configuration.

use common::JwtConfig;

/// Auth service configuration.
#[derive(Debug, Clone, Default)]
pub struct AuthServiceConfig {
    /// Login token signing
    pub jwt: JwtConfig,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
        }
    }

    /// Get JWT secret as bytes.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt.secret.as_bytes()
    }
}
