//! User repository backed by a single JSON document.

use async_trait::async_trait;

use common::AppResult;
use domain::Registry;

use crate::infra::JsonFile;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// The collection is always loaded and saved as a whole.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Load every record
    async fn load(&self) -> AppResult<Registry>;

    /// Replace every record
    async fn save(&self, registry: &Registry) -> AppResult<()>;
}

/// Concrete implementation of UserRepository over a JSON file
pub struct UserStore {
    file: JsonFile,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(file: JsonFile) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &JsonFile {
        &self.file
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn load(&self) -> AppResult<Registry> {
        self.file.read::<Registry>().await
    }

    async fn save(&self, registry: &Registry) -> AppResult<()> {
        self.file.write(registry).await
    }
}
