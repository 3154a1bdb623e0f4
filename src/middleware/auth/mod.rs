//! Authentication pipeline: credential extraction, then token verification.
pub mod access;
pub mod bearer;
