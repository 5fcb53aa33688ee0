//! User Service Library
//!
//! This crate owns the user records: the JSON document store, the
//! repository over it and the business rules applied on every mutation.
//! It is embedded by the HTTP API binary.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::{AppResult, StoreConfig};
use domain::Registry;

use crate::config::UserServiceConfig;
use crate::infra::JsonFile;
use crate::repository::{UserRepository, UserStore};
use crate::service::{UserManager, UserService};

/// Build the user service over the configured store.
pub fn build_user_service(config: &UserServiceConfig) -> Arc<dyn UserService> {
    let repo = Arc::new(UserStore::new(JsonFile::new(config.store.path.clone())));
    Arc::new(UserManager::new(repo))
}

/// Store maintenance action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreAction {
    /// Create an empty store if none exists
    Init,
    /// Print where the store lives and how many records it holds
    Status,
}

/// Run a store maintenance action (for CLI commands).
pub async fn run_store_action(action: StoreAction, config: &StoreConfig) -> AppResult<()> {
    let store = UserStore::new(JsonFile::new(config.path.clone()));

    match action {
        StoreAction::Init => {
            if store.file().exists().await? {
                info!("Store {} already exists", config.path.display());
            } else {
                store.save(&Registry::default()).await?;
                info!("Created empty store at {}", config.path.display());
            }
        }
        StoreAction::Status => {
            let exists = store.file().exists().await?;
            let registry = store.load().await?;
            println!("path:    {}", config.path.display());
            println!("exists:  {}", exists);
            println!("records: {}", registry.len());
            println!("lastId:  {}", registry.last_id);
        }
    }

    Ok(())
}
