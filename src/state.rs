/*
 * Responsibility
 * - Shared context handed to the router (AppState)
 * - Clone is cheap (Arc inside); nothing in here is mutated per request
 */
use std::sync::Arc;

use crate::services::auth::TokenVerifier;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(auth: Arc<TokenVerifier>) -> Self {
        Self { auth }
    }
}
