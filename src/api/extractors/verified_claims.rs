use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::services::auth::{AuthRejection, ClaimSet, InfraError};

/// Handler-side access to the claims the access middleware verified.
///
/// The middleware inserts `ClaimSet` into request extensions. If it is not there
/// (route mounted outside the auth layer) the handler is not run and the client
/// gets 403 "Could not validate credentials.".
#[derive(Debug, Clone)]
pub struct VerifiedClaims(pub ClaimSet);

impl<S> FromRequestParts<S> for VerifiedClaims
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClaimSet>()
            .cloned()
            .map(VerifiedClaims)
            .ok_or(AuthRejection::Infrastructure(InfraError::MissingContext))
    }
}

/// Claims lookup on a raw request, for code that handles `Request` directly.
pub trait ClaimsExt {
    fn claims(&self) -> Option<&ClaimSet>;
}

impl<B> ClaimsExt for axum::http::Request<B> {
    fn claims(&self) -> Option<&ClaimSet> {
        self.extensions().get::<ClaimSet>()
    }
}
