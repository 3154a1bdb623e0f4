use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Header};

use crate::services::auth::keys::source::{KeySource, KeySourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyFamily {
    Rsa,
    Ec,
    Ed,
    Hmac,
}

fn family(alg: Algorithm) -> KeyFamily {
    match alg {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => KeyFamily::Rsa,
        Algorithm::ES256 | Algorithm::ES384 => KeyFamily::Ec,
        Algorithm::EdDSA => KeyFamily::Ed,
        _ => KeyFamily::Hmac,
    }
}

/// One public key, loaded once from PEM. Every token is checked against it
/// regardless of `kid`.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct StaticKeySource {
    key: DecodingKey,
}

impl std::fmt::Debug for StaticKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticKeySource").finish_non_exhaustive()
    }
}

impl StaticKeySource {
    /// The PEM is parsed according to the family of `algorithms`, which must all agree.
    pub fn from_pem(pem: &str, algorithms: &[Algorithm]) -> Result<Self, KeySourceError> {
        let families: Vec<KeyFamily> = algorithms.iter().map(|a| family(*a)).collect();
        let Some(first) = families.first().copied() else {
            return Err(KeySourceError::UnusableAlgorithms(String::new()));
        };
        if families.iter().any(|f| *f != first) {
            return Err(KeySourceError::UnusableAlgorithms(format!("{algorithms:?}")));
        }

        let bytes = pem.as_bytes();
        let key = match first {
            KeyFamily::Rsa => DecodingKey::from_rsa_pem(bytes),
            KeyFamily::Ec => DecodingKey::from_ec_pem(bytes),
            KeyFamily::Ed => DecodingKey::from_ed_pem(bytes),
            KeyFamily::Hmac => {
                return Err(KeySourceError::UnusableAlgorithms(format!("{algorithms:?}")));
            }
        }
        .map_err(KeySourceError::KeyMaterial)?;

        Ok(Self { key })
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    fn name(&self) -> &'static str {
        "static-pem"
    }

    async fn decoding_key(&self, _header: &Header) -> Result<Option<DecodingKey>, KeySourceError> {
        Ok(Some(self.key.clone()))
    }
}
