pub mod claims;
pub mod error;
pub mod factory;
pub mod keys;
pub mod verifier;

pub use claims::ClaimSet;
pub use error::{AuthRejection, HeaderError, InfraError, TokenError};
pub use factory::build_token_verifier;
pub use verifier::TokenVerifier;
