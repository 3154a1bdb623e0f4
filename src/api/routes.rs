/*
 * Responsibility
 * - URL structure of the API
 * - Authentication is applied by the caller (app.rs) over the whole router
 */
use axum::{Router, routing::get};

use crate::api::handlers::users::get_data;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().nest("/users", Router::new().route("/data", get(get_data)))
}
