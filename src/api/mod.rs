/*
 * Responsibility
 * - Public surface of the API layer (routes() re-export)
 */
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
