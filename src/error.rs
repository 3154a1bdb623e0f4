/*
 * Responsibility
 * - Startup error type (AppError)
 * - IntoResponse for authentication rejections: status + `{"detail": "..."}`
 */
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::auth::{AuthRejection, keys::KeySourceError};

/// Rejection body. The shape is fixed: one `detail` string.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: &'static str,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = DetailResponse {
            detail: self.detail(),
        };

        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not set up token verification: {0}")]
    KeySource(#[from] KeySourceError),
    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}
