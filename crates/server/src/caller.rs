use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::domain::Principal;

/// Header carrying the email verified by the authenticating proxy in front of
/// this service.
pub const CALLER_HEADER: &str = "x-user-email";

/// The request's identity, if any. Never rejects; operations decide whether
/// an anonymous caller is acceptable.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Principal::from_email);
        Ok(Self(principal))
    }
}
