//! User Registry HTTP API
//!
//! The axum surface over the user and auth services: routes, handlers,
//! extractors, the address lookup client and the OpenAPI document.

pub mod clients;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::info;

use auth_service_lib::{build_auth_service, config::AuthServiceConfig};
use common::AppResult;
use user_service_lib::{build_user_service, config::UserServiceConfig};

use crate::clients::ViaCepNominatim;
use crate::config::ApiConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Wire the services and clients described by `config`.
pub fn build_state(config: ApiConfig) -> AppResult<AppState> {
    let user_service = build_user_service(&UserServiceConfig {
        store: config.store.clone(),
    });
    let auth_service = build_auth_service(
        user_service.clone(),
        &AuthServiceConfig {
            jwt: config.jwt.clone(),
        },
    );
    let address_lookup = Arc::new(ViaCepNominatim::new(config.geo.clone())?);

    Ok(AppState::new(
        user_service,
        auth_service,
        address_lookup,
        config,
    ))
}

/// Run the HTTP server with the given configuration.
pub async fn run_server(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = config.bind_address().parse()?;
    info!("Using store at {}", config.store.path.display());

    let state = build_state(config)?;
    let app = create_router(state).layer(TraceLayer::new_for_http());

    info!("User registry listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
