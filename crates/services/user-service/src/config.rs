//! User service configuration.

use common::StoreConfig;

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    /// Where the record collection lives
    pub store: StoreConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
        }
    }
}
