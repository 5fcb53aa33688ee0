//! Shared configuration structures.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Host address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origin, `None` allows any
    pub cors_allow_origin: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("API_HOST").unwrap_or(defaults.host),
            port: env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cors_allow_origin: env::var("CORS_ALLOW_ORIGIN")
                .ok()
                .filter(|origin| !origin.is_empty() && origin != "*"),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allow_origin: None,
        }
    }
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Path of the JSON document holding every record
    pub path: PathBuf,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| Self::default().path),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.json"),
        }
    }
}

/// JWT configuration for login tokens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    #[serde(skip_serializing)]
    pub secret: String,
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(defaults.expiration_hours),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "development-secret-change-me".to_string(),
            expiration_hours: domain::DEFAULT_JWT_EXPIRATION_HOURS,
        }
    }
}

/// Postal-code lookup and geocoding endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeoConfig {
    /// ViaCEP-compatible base URL, queried as `{base}/{cep}/json/`
    pub viacep_url: String,
    /// Nominatim-compatible base URL, queried as `{base}/search`
    pub nominatim_url: String,
    /// User agent sent to the geocoder (Nominatim rejects anonymous clients)
    pub user_agent: String,
}

impl GeoConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            viacep_url: env::var("VIACEP_URL").unwrap_or(defaults.viacep_url),
            nominatim_url: env::var("NOMINATIM_URL").unwrap_or(defaults.nominatim_url),
            user_agent: env::var("GEO_USER_AGENT").unwrap_or(defaults.user_agent),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            viacep_url: "https://viacep.com.br/ws".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("user-registry/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
