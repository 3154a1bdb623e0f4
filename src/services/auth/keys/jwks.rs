//! Remote JWK set (the provider's published signing keys).
//!
//! Policy:
//! - One fetch is shared by the whole process; the set is swapped in whole behind an
//!   `RwLock`, so readers see either the old or the new set, never a mix.
//! - The set is refetched once it is older than `ttl`.
//! - A token whose `kid` is not in the set forces a refetch (key rotation), at most once
//!   per `min_refresh_interval`.
//! - Concurrent refreshes collapse into one request.
//! - A failed fetch is an error for the request that needed it; stale keys are not served.
//!   Requests queued behind that fetch, and any refresh inside `min_refresh_interval` of
//!   it, fail straight away instead of fetching again.
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{
    DecodingKey, Header,
    jwk::{Jwk, JwkSet},
};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::services::auth::keys::source::{KeySource, KeySourceError};

#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub ttl: Duration,
    pub min_refresh_interval: Duration,
}

struct CachedJwks {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
}

struct FetchFailure {
    at: Instant,
    reason: String,
}

pub struct JwksKeySource {
    client: reqwest::Client,
    url: Url,
    policy: RefreshPolicy,
    cache: RwLock<Option<CachedJwks>>,
    // Single-flight guard for refreshes; holds the last failed fetch, if any.
    refresh: Mutex<Option<FetchFailure>>,
}

impl std::fmt::Debug for JwksKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwksKeySource")
            .field("url", &self.url.as_str())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl JwksKeySource {
    /// `fetch_timeout` bounds the whole request (connect + body).
    pub fn new(url: Url, fetch_timeout: Duration, policy: RefreshPolicy) -> Result<Self, KeySourceError> {
        let client = reqwest::Client::builder().timeout(fetch_timeout).build()?;

        Ok(Self {
            client,
            url,
            policy,
            cache: RwLock::new(None),
            refresh: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Current key set, fetching it when absent or older than the TTL.
    async fn current(&self) -> Result<Arc<JwkSet>, KeySourceError> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if cached.fetched_at.elapsed() < self.policy.ttl {
                return Ok(cached.keys.clone());
            }
        }

        let ttl = self.policy.ttl;
        self.refresh_if(|cached| cached.fetched_at.elapsed() >= ttl).await
    }

    /// Fetch a new set unless the cached one is still good according to `stale`.
    /// Whoever waited on the guard reuses what the previous holder got: its set, or its
    /// failure.
    async fn refresh_if<F>(&self, stale: F) -> Result<Arc<JwkSet>, KeySourceError>
    where
        F: Fn(&CachedJwks) -> bool,
    {
        let queued_at = Instant::now();
        let mut last_failure = self.refresh.lock().await;

        if let Some(cached) = self.cache.read().await.as_ref() {
            if !stale(cached) {
                return Ok(cached.keys.clone());
            }
        }

        if let Some(failure) = last_failure.as_ref() {
            if failure.at >= queued_at || failure.at.elapsed() < self.policy.min_refresh_interval {
                return Err(KeySourceError::RecentFailure(failure.reason.clone()));
            }
        }

        let jwks = match self.fetch().await {
            Ok(jwks) => jwks,
            Err(err) => {
                tracing::warn!(url = %self.url, error = %err, "jwks refresh failed");
                *last_failure = Some(FetchFailure {
                    at: Instant::now(),
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        *last_failure = None;
        let keys = Arc::new(jwks);
        *self.cache.write().await = Some(CachedJwks {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });

        Ok(keys)
    }

    async fn fetch(&self) -> Result<JwkSet, KeySourceError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySourceError::Status(status));
        }

        let jwks: JwkSet = response.json().await?;
        tracing::info!(url = %self.url, keys = jwks.keys.len(), "jwks refreshed");

        Ok(jwks)
    }
}

/// By `kid`; a token without `kid` only matches a single-key set.
fn select<'a>(jwks: &'a JwkSet, header: &Header) -> Option<&'a Jwk> {
    match header.kid.as_deref() {
        Some(kid) => jwks.find(kid),
        None if jwks.keys.len() == 1 => jwks.keys.first(),
        None => None,
    }
}

fn to_decoding_key(jwk: &Jwk) -> Result<DecodingKey, KeySourceError> {
    DecodingKey::from_jwk(jwk).map_err(KeySourceError::KeyMaterial)
}

#[async_trait]
impl KeySource for JwksKeySource {
    fn name(&self) -> &'static str {
        "jwks"
    }

    async fn decoding_key(&self, header: &Header) -> Result<Option<DecodingKey>, KeySourceError> {
        let jwks = self.current().await?;
        if let Some(jwk) = select(&jwks, header) {
            return to_decoding_key(jwk).map(Some);
        }

        // Unknown kid: the provider may have rotated keys since our last fetch.
        let min_interval = self.policy.min_refresh_interval;
        let jwks = self
            .refresh_if(|cached| cached.fetched_at.elapsed() >= min_interval)
            .await?;

        match select(&jwks, header) {
            Some(jwk) => to_decoding_key(jwk).map(Some),
            None => {
                tracing::debug!(kid = ?header.kid, "no jwk matches token");
                Ok(None)
            }
        }
    }

    async fn warm_up(&self) -> Result<(), KeySourceError> {
        self.current().await.map(|_| ())
    }
}
