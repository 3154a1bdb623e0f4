//! `Authorization: Bearer <token>` parsing.
use axum::http::{HeaderMap, header};

use crate::services::auth::HeaderError;

/// Pulls the raw token out of the `Authorization` header.
///
/// The value must be exactly `<scheme> <credentials>` (any run of ASCII whitespace
/// between them, surrounding whitespace ignored) with a case-insensitive `bearer`
/// scheme. The credential is returned untouched.
pub fn extract(headers: &HeaderMap) -> Result<&str, HeaderError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or(HeaderError::Missing)?;

    let value = value.to_str().map_err(|_| HeaderError::Malformed)?;

    let mut parts = value.split_ascii_whitespace();
    let (Some(scheme), Some(credentials), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(HeaderError::Malformed);
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(HeaderError::UnsupportedScheme);
    }

    Ok(credentials)
}
