//! Custom request extractors.

mod requesting_user;
mod validated_json;

pub use requesting_user::RequestingUser;
pub use validated_json::ValidatedJson;
