/*
 * Responsibility
 * - Public entry points of each middleware (`apply` functions)
 * - auth is applied to the API router; the rest wrap the whole app
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
