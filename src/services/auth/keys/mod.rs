pub mod jwks;
pub mod source;
pub mod static_pem;

pub use jwks::{JwksKeySource, RefreshPolicy};
pub use source::{KeySource, KeySourceError};
pub use static_pem::StaticKeySource;
