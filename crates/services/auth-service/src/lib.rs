//! Auth Service Library
//!
//! Login and password reset on top of the user service. Login issues a
//! signed JWT; reset hands out a short numeric code stored on the record.

pub mod config;
pub mod service;

use std::sync::Arc;

use user_service_lib::service::UserService;

use crate::config::AuthServiceConfig;
use crate::service::{AuthService, Authenticator};

/// Build the auth service on top of an existing user service.
pub fn build_auth_service(
    users: Arc<dyn UserService>,
    config: &AuthServiceConfig,
) -> Arc<dyn AuthService> {
    Arc::new(Authenticator::new(users, config.jwt.clone()))
}
