use axum::{
    http::{Method, StatusCode, Uri},
    Json,
};
use serde_json::{json, Value};

use crate::app::errors::ApiError;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        format!("No handler found for {method} {}", uri.path()),
    )
}
