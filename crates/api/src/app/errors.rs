use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use stockroom_core::DomainError;
use stockroom_infra::services::ServiceError;

pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred";

/// JSON error body. `path` is filled in by the request middleware, which is
/// the only place that knows the request URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub timestamp: String,
    pub status: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
    pub path: String,
}

impl ErrorBody {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn at(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.clone())).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<BTreeMap<String, String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            timestamp: Utc::now().to_rfc3339(),
            status: self.status.as_u16(),
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: self.message.clone(),
            details: self.details.clone(),
            path: String::new(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => Self {
                status: StatusCode::BAD_REQUEST,
                message: "Validation failed".into(),
                details: Some(
                    fields
                        .iter()
                        .map(|f| (f.field.clone(), f.message.clone()))
                        .collect(),
                ),
            },
            DomainError::InvalidArgument(msg) => Self::bad_request(msg),
            e @ DomainError::InsufficientInventory { .. } => Self::bad_request(e.to_string()),
            DomainError::NotFound(msg) => Self::not_found(msg),
            DomainError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => e.into(),
            internal => {
                tracing::error!(error = %internal, "request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.body().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::FieldErrors;
    use stockroom_infra::store::StoreError;

    #[test]
    fn domain_kinds_map_to_fixed_statuses() {
        let cases = [
            (DomainError::not_found("Product not found with id: 1"), StatusCode::NOT_FOUND),
            (DomainError::conflict("taken"), StatusCode::CONFLICT),
            (DomainError::invalid_argument("bad"), StatusCode::BAD_REQUEST),
            (DomainError::insufficient_inventory(5, 10), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn validation_lists_every_field() {
        let mut fields = FieldErrors::new();
        fields.push("name", "Product name is required");
        fields.push("price", "Price must be greater than 0");
        let body = ApiError::from(DomainError::validation(fields)).body();
        assert_eq!(body.status, 400);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(body.message, "Validation failed");
        assert_eq!(body.details.unwrap().len(), 2);
    }

    #[test]
    fn infrastructure_failures_hide_their_detail() {
        let err = ApiError::from(ServiceError::from(StoreError::Backend("connection refused".into())));
        let body = err.body();
        assert_eq!(body.status, 500);
        assert_eq!(body.message, INTERNAL_MESSAGE);
        assert!(body.details.is_none());
    }
}
