//! Signing-key lookup used by `TokenVerifier`.
use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Header};
use thiserror::Error;

/// Key-source failures. Every one of these means "could not validate", never
/// "bad token": the caller maps them to the infrastructure rejection.
#[derive(Debug, Error)]
pub enum KeySourceError {
    #[error("jwks request failed: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("jwks endpoint answered {0}")]
    Status(reqwest::StatusCode),
    #[error("jwks unavailable, last fetch failed: {0}")]
    RecentFailure(String),
    #[error("unusable key material: {0}")]
    KeyMaterial(#[source] jsonwebtoken::errors::Error),
    #[error("algorithms {0} cannot be served by one public key")]
    UnusableAlgorithms(String),
}

/// Resolves the key a token claims to be signed with.
///
/// Returns:
/// - `Ok(Some(key))` when a key matches the header (`kid`)
/// - `Ok(None)` when no key matches (the token is rejected as invalid)
/// - `Err(_)` when keys could not be obtained
///
/// Implementations are shared across requests and must be safe to call concurrently.
#[async_trait]
pub trait KeySource: Send + Sync {
    // Backend name for logs.
    fn name(&self) -> &'static str;

    async fn decoding_key(&self, header: &Header) -> Result<Option<DecodingKey>, KeySourceError>;

    // Load keys ahead of the first request, if the source has anything to load.
    async fn warm_up(&self) -> Result<(), KeySourceError> {
        Ok(())
    }
}
