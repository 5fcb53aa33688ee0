//! Service layer containing business logic.

mod user_service;

#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
pub use user_service::{UserManager, UserService};
