//! Bearer token gate: `Authorization` header → token verification → `ClaimSet` in extensions.
//!
//! - On success the request continues with the claims attached; the handler's
//!   response is passed through untouched.
//! - On any failure the next stage is never called and the client gets
//!   `{"detail": "..."}` with 401 or 403.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::middleware::auth::bearer;
use crate::services::auth::{AuthRejection, ClaimSet, TokenVerifier};
use crate::state::AppState;

/// Puts every route (and the fallback) of `router` behind token verification.
///
/// Example:
/// ```ignore
/// let api = middleware::auth::access::apply(api::routes(), state.clone());
/// let app = api.with_state(state);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8: State has to be passed explicitly with `from_fn_with_state`
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    let claims = match authenticate(&state.auth, req.headers()).await {
        Ok(claims) => claims,
        Err(rejection) => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                status = rejection.status().as_u16(),
                error = %rejection,
                "request rejected"
            );
            return Err(rejection);
        }
    };

    tracing::debug!(subject = ?claims.subject(), "request authenticated");

    // middleware → extractor
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Header check followed by token verification, without touching the request.
pub async fn authenticate(
    verifier: &TokenVerifier,
    headers: &HeaderMap,
) -> Result<ClaimSet, AuthRejection> {
    let token = bearer::extract(headers)?;
    verifier.verify(token).await
}
