//! In-memory user repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::AppResult;
use domain::Registry;

use super::UserRepository;

/// Repository keeping the collection in memory only.
///
/// Handy for tests and throwaway runs; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    registry: RwLock<Registry>,
}

impl MemoryStore {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn load(&self) -> AppResult<Registry> {
        Ok(self.registry.read().await.clone())
    }

    async fn save(&self, registry: &Registry) -> AppResult<()> {
        *self.registry.write().await = registry.clone();
        Ok(())
    }
}
