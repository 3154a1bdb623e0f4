//! Rejection taxonomy for the authentication gate.
//!
//! Internally every failure keeps its cause (for logs). On the wire only four
//! messages exist, and token-content failures are never told apart.
use axum::http::StatusCode;
use jsonwebtoken::{Algorithm, errors::Error as JwtError};
use thiserror::Error;

use crate::services::auth::keys::KeySourceError;

pub const MISSING_HEADER_DETAIL: &str = "Missing Authorization header.";
pub const INVALID_SCHEME_DETAIL: &str = "Invalid authorization scheme.";
pub const INVALID_TOKEN_DETAIL: &str = "Invalid token.";
pub const COULD_NOT_VALIDATE_DETAIL: &str = "Could not validate credentials.";

/// Problems with the `Authorization` header itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("missing authorization header")]
    Missing,
    #[error("malformed authorization header")]
    Malformed,
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
}

/// The token was read but is not acceptable.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(#[source] JwtError),
    #[error("algorithm {0:?} is not accepted")]
    DisallowedAlgorithm(Algorithm),
    #[error("algorithm does not match the signing key")]
    AlgorithmMismatch,
    #[error("no signing key matches kid {0:?}")]
    UnknownKey(Option<String>),
    #[error("signature mismatch")]
    Signature,
    #[error("audience mismatch")]
    Audience,
    #[error("issuer mismatch")]
    Issuer,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("invalid claims: {0}")]
    Claims(#[source] JwtError),
}

/// Verification could not be carried out at all.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    KeySource(#[from] KeySourceError),
    #[error("unexpected verification failure: {0}")]
    Unexpected(#[source] JwtError),
    #[error("verified claims missing from request context")]
    MissingContext,
}

#[derive(Debug, Error)]
pub enum AuthRejection {
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Infrastructure(#[from] InfraError),
}

impl AuthRejection {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::Header(_) => StatusCode::FORBIDDEN,
            AuthRejection::Token(_) => StatusCode::UNAUTHORIZED,
            AuthRejection::Infrastructure(_) => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing message. Malformed headers share the scheme message.
    pub fn detail(&self) -> &'static str {
        match self {
            AuthRejection::Header(HeaderError::Missing) => MISSING_HEADER_DETAIL,
            AuthRejection::Header(HeaderError::Malformed | HeaderError::UnsupportedScheme) => {
                INVALID_SCHEME_DETAIL
            }
            AuthRejection::Token(_) => INVALID_TOKEN_DETAIL,
            AuthRejection::Infrastructure(_) => COULD_NOT_VALIDATE_DETAIL,
        }
    }
}
