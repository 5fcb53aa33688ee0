//! Application state for dependency injection.

use std::sync::Arc;

use auth_service_lib::service::AuthService;
use user_service_lib::service::UserService;

use crate::clients::AddressLookup;
use crate::config::ApiConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub auth_service: Arc<dyn AuthService>,
    pub address_lookup: Arc<dyn AddressLookup>,
    pub config: ApiConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        user_service: Arc<dyn UserService>,
        auth_service: Arc<dyn AuthService>,
        address_lookup: Arc<dyn AddressLookup>,
        config: ApiConfig,
    ) -> Self {
        Self {
            user_service,
            auth_service,
            address_lookup,
            config,
        }
    }
}
