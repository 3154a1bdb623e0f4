//! Factory: build `TokenVerifier` from the auth section of `Config`.
use std::sync::Arc;

use crate::config::{AuthSettings, KeySourceSettings};
use crate::services::auth::TokenVerifier;
use crate::services::auth::keys::{
    JwksKeySource, KeySource, KeySourceError, RefreshPolicy, StaticKeySource,
};

pub fn build_token_verifier(settings: &AuthSettings) -> Result<Arc<TokenVerifier>, KeySourceError> {
    let keys: Arc<dyn KeySource> = match &settings.key_source {
        KeySourceSettings::StaticPem(pem) => {
            Arc::new(StaticKeySource::from_pem(pem, &settings.algorithms)?)
        }
        KeySourceSettings::Jwks {
            url,
            cache_ttl,
            min_refresh_interval,
            fetch_timeout,
        } => Arc::new(JwksKeySource::new(
            url.clone(),
            *fetch_timeout,
            RefreshPolicy {
                ttl: *cache_ttl,
                min_refresh_interval: *min_refresh_interval,
            },
        )?),
    };

    tracing::info!(
        key_source = keys.name(),
        algorithms = ?settings.algorithms,
        audience = %settings.audience,
        "token verifier ready"
    );

    Ok(Arc::new(TokenVerifier::new(settings, keys)))
}
