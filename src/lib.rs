//! Bearer-token gateway in front of the user API.
//!
//! Every request goes through [`middleware::auth::access`], which extracts the
//! `Authorization: Bearer <token>` credential, verifies it against the identity
//! provider's keys and either forwards the request with a [`services::auth::ClaimSet`]
//! attached or answers with `{"detail": "..."}`.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
