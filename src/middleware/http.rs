//! Transport middleware around the gateway.
//!
//! - `x-request-id` is assigned when absent and echoed back; trace spans carry it
//! - request bodies are capped at `REQUEST_BODY_LIMIT_BYTES`
//! - a request that outlives `REQUEST_TIMEOUT_SECONDS` is answered with a 408
//!
//! Failures raised by these layers use the same `{"detail": ...}` body as
//! authentication rejections.

use axum::body::Body;
use axum::{Json, Router};
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, StatusCode, header::HeaderName};
use axum::response::{IntoResponse, Response};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::config::Config;
use crate::error::DetailResponse;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub const TIMEOUT_DETAIL: &str = "Request timed out.";
pub const INTERNAL_DETAIL: &str = "Internal server error.";

pub fn apply(router: Router, config: &Config) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Outermost first. The request id wraps the error handler so timeouts carry it too.
    let stack = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(request_id))
        .layer(HandleErrorLayer::new(layer_failure))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(RequestBodyLimitLayer::new(config.request_body_limit_bytes))
        .layer(TimeoutLayer::new(config.request_timeout));

    router.layer(stack)
}

fn request_span(req: &Request<Body>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}

async fn layer_failure(err: BoxError) -> Response {
    let (status, detail) = if err.is::<Elapsed>() {
        tracing::warn!("request timed out");
        (StatusCode::REQUEST_TIMEOUT, TIMEOUT_DETAIL)
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_DETAIL)
    };

    (status, Json(DetailResponse { detail })).into_response()
}
