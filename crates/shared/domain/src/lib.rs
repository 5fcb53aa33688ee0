//! Domain layer - Core business entities and rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! The store document, listing rules, cascading delete and reset codes all
//! live here so services only have to load, call and save.

pub mod constants;
pub mod error;
pub mod listing;
pub mod registry;
pub mod reset;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use listing::{Page, PageRequest, UserFilter};
pub use registry::{Deletion, Registry};
pub use reset::{ResetCode, ResetFlow};
pub use user::{NewUser, User, UserPatch, UserResponse};
