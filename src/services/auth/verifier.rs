use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};

use crate::config::AuthSettings;
use crate::services::auth::{
    claims::ClaimSet,
    error::{AuthRejection, InfraError, TokenError},
    keys::{KeySource, KeySourceError},
};

/// Access-token verifier for tokens issued by the identity provider.
///
/// Settings are fixed at construction; nothing is remembered between calls, so the same
/// token verifies the same way every time (no replay tracking).
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Arc<dyn KeySource>,
    algorithms: Vec<Algorithm>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys.name())
            .field("algorithms", &self.algorithms)
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(settings: &AuthSettings, keys: Arc<dyn KeySource>) -> Self {
        let mut validation = Validation::default();
        validation.set_audience(&[settings.audience.as_str()]);
        // `exp`/`nbf` are checked when present; `aud` must be present, and so must
        // `iss` once an issuer is configured (jsonwebtoken skips an absent `iss`).
        validation.set_required_spec_claims(&["aud"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = settings.leeway_seconds;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer.as_str()]);
            validation.set_required_spec_claims(&["aud", "iss"]);
        }

        Self {
            keys,
            algorithms: settings.algorithms.clone(),
            validation,
        }
    }

    /// Verify a raw bearer token and return its claims.
    ///
    /// Order:
    /// 1. token structure (header decodes)
    /// 2. header algorithm is in the accepted set
    /// 3. a signing key matches the header
    /// 4. signature, then `aud` / `iss` / `exp` / `nbf`
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, AuthRejection> {
        let header = jsonwebtoken::decode_header(token).map_err(TokenError::Malformed)?;

        if !self.algorithms.contains(&header.alg) {
            return Err(TokenError::DisallowedAlgorithm(header.alg).into());
        }

        let key = self
            .keys
            .decoding_key(&header)
            .await
            .map_err(InfraError::from)?
            .ok_or_else(|| TokenError::UnknownKey(header.kid.clone()))?;

        // Only the header's own algorithm; a mixed accepted set would otherwise
        // fail jsonwebtoken's key-family check.
        let mut validation = self.validation.clone();
        validation.algorithms = vec![header.alg];

        let data = jsonwebtoken::decode::<ClaimSet>(token, &key, &validation).map_err(classify)?;

        Ok(data.claims)
    }

    pub async fn warm_up(&self) -> Result<(), KeySourceError> {
        self.keys.warm_up().await
    }
}

/// Token-content failures become 401s; anything about keys or crypto plumbing is
/// an infrastructure failure.
fn classify(err: jsonwebtoken::errors::Error) -> AuthRejection {
    match err.kind() {
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            TokenError::Malformed(err).into()
        }
        ErrorKind::InvalidSignature => TokenError::Signature.into(),
        ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => TokenError::AlgorithmMismatch.into(),
        ErrorKind::InvalidAudience => TokenError::Audience.into(),
        ErrorKind::InvalidIssuer => TokenError::Issuer.into(),
        ErrorKind::ExpiredSignature => TokenError::Expired.into(),
        ErrorKind::ImmatureSignature => TokenError::NotYetValid.into(),
        ErrorKind::MissingRequiredClaim(_) | ErrorKind::InvalidClaimFormat(_) | ErrorKind::InvalidSubject => {
            TokenError::Claims(err).into()
        }
        _ => InfraError::Unexpected(err).into(),
    }
}
