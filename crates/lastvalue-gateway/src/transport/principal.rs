use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::policy::Principal;

/// Header carrying the principal asserted by the authenticating proxy.
pub const PRINCIPAL_HEADER: &str = "x-lastvalue-principal";

/// Caller principal; `anonymous` when the header is absent, empty, or not UTF-8.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Principal::new)
            .unwrap_or_else(Principal::anonymous);
        Ok(Caller(principal))
    }
}
