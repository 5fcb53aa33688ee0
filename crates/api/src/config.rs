//! API configuration.

use common::{GeoConfig, JwtConfig, ServiceConfig, StoreConfig};

/// Everything the HTTP binary needs, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    /// Bind address and CORS
    pub server: ServiceConfig,
    /// Record store location
    pub store: StoreConfig,
    /// Login token signing
    pub jwt: JwtConfig,
    /// Postal-code lookup and geocoding endpoints
    pub geo: GeoConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            server: ServiceConfig::from_env(),
            store: StoreConfig::from_env(),
            jwt: JwtConfig::from_env(),
            geo: GeoConfig::from_env(),
        }
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
