/*
 * Responsibility
 * - /users handlers
 * - Only reached with verified claims in the request (see VerifiedClaims)
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::extractors::VerifiedClaims;

pub async fn get_data(VerifiedClaims(claims): VerifiedClaims) -> Json<Value> {
    tracing::debug!(subject = ?claims.subject(), "serving user data");
    Json(json!({"message": "Hello World"}))
}
