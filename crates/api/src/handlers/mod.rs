//! HTTP handlers.

pub mod address_handler;
pub mod auth_handler;
pub mod health_handler;
pub mod user_handler;

pub use address_handler::address_routes;
pub use auth_handler::auth_routes;
pub use health_handler::health_routes;
pub use user_handler::user_routes;
