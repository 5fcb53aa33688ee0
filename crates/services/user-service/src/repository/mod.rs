//! Repository layer for data access.

mod memory_repository;
mod user_repository;

pub use memory_repository::MemoryStore;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserStore};
