/// API routes and handlers
pub mod auth;
pub mod middleware;

use crate::context::AppContext;
use axum::{Json, Router};
use serde::Serialize;

/// Uniform response envelope: success flag, human-readable message,
/// optional payload
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Wrap a payload in the success envelope
pub fn success<T: Serialize>(message: &str, data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        status: true,
        message: message.to_string(),
        data: Some(data),
    })
}

/// Success envelope with no payload
pub fn message_only(message: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        status: true,
        message: message.to_string(),
        data: None,
    })
}

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new().merge(auth::routes())
}
