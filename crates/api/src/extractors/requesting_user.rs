//! Identity of the caller, taken from the `user-id` header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use common::AppError;
use domain::REQUESTING_USER_HEADER;

/// The acting user's id as claimed by the client.
///
/// Nothing verifies the claim; the header is trusted as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestingUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for RequestingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(REQUESTING_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id != 0)
            .map(RequestingUser)
            .ok_or_else(|| AppError::BadRequest("Logged user id not provided".to_string()))
    }
}
