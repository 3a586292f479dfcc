use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::app::errors::ErrorBody;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Runs every request inside a span keyed by a fresh UUIDv7 request id,
/// echoes the id in `x-request-id`, and stamps error bodies with the
/// request path.
pub async fn request_context(req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!(
        "http_request",
        %request_id,
        %method,
        %path,
        status = tracing::field::Empty,
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(req).await;

        if let Some(body) = response.extensions_mut().remove::<ErrorBody>() {
            response = body.at(&path).into_response();
        }

        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "request completed");

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}
