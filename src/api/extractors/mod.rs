/*!
 * Request extractors
 *
 * Public API:
 * - VerifiedClaims
 * - ClaimsExt
 */
mod verified_claims;

pub use verified_claims::{ClaimsExt, VerifiedClaims};
